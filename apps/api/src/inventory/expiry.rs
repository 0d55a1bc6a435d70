use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::DatedItem;

/// The only accepted encoding for expiration dates.
pub const EXPIRATION_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Normal,
}

/// Parses a `yyyy-MM-dd` date.
///
/// The shape is checked before chrono sees the text, so single-digit months,
/// signed years and padded input are rejected instead of normalized.
pub fn parse_expiration(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(text, EXPIRATION_FORMAT).ok()
}

fn expiration_of(item: &DatedItem) -> Option<NaiveDate> {
    item.expiration_date.as_deref().and_then(parse_expiration)
}

/// Whole days from `today` until the item expires. Negative once expired,
/// `None` when the item has no usable date.
pub fn days_until_expiration(item: &DatedItem, today: NaiveDate) -> Option<i64> {
    expiration_of(item).map(|date| (date - today).num_days())
}

/// True iff the expiration date is strictly before `today`.
/// Missing or unparseable dates never count as expired.
pub fn is_expired(item: &DatedItem, today: NaiveDate) -> bool {
    expiration_of(item).is_some_and(|date| date < today)
}

/// True iff the item expires within `threshold_days` (inclusive), counting
/// today as day 0. Already-expired items fall outside the window.
pub fn is_expiring_soon(item: &DatedItem, today: NaiveDate, threshold_days: u32) -> bool {
    days_until_expiration(item, today)
        .is_some_and(|days| (0..=i64::from(threshold_days)).contains(&days))
}

/// Expired wins over expiring soon; everything else is normal.
pub fn classify(item: &DatedItem, today: NaiveDate, threshold_days: u32) -> ExpiryStatus {
    if is_expired(item, today) {
        ExpiryStatus::Expired
    } else if is_expiring_soon(item, today, threshold_days) {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Normal
    }
}
