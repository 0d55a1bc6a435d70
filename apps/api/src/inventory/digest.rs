use chrono::NaiveDate;
use serde::Serialize;

use crate::inventory::expiry::ExpiryStatus;
use crate::inventory::listing::{annotate, build_listing, ItemFilter, ListedItem, ListingQuery, SortMode};
use crate::models::DatedItem;

/// What a fridge's notification screen shows: everything that needs
/// attention, soonest first.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiryDigest {
    pub today: NaiveDate,
    pub threshold_days: u32,
    pub total_items: usize,
    pub expired_count: usize,
    pub expiring_soon_count: usize,
    pub items: Vec<ListedItem>,
}

pub fn compute_digest(items: &[DatedItem], today: NaiveDate, threshold_days: u32) -> ExpiryDigest {
    let by_date = |filter| ListingQuery {
        search: None,
        filter,
        sort: SortMode::ExpirationDate,
        threshold_days,
    };

    let mut flagged = build_listing(items, &by_date(ItemFilter::Expired), today);
    flagged.extend(build_listing(items, &by_date(ItemFilter::ExpiringSoon), today));
    let flagged = annotate(flagged, today, threshold_days);

    let expired_count = flagged
        .iter()
        .filter(|i| i.status == ExpiryStatus::Expired)
        .count();

    ExpiryDigest {
        today,
        threshold_days,
        total_items: items.len(),
        expired_count,
        expiring_soon_count: flagged.len() - expired_count,
        items: flagged,
    }
}
