use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::inventory::expiry::{
    classify, days_until_expiration, is_expired, is_expiring_soon, parse_expiration,
    ExpiryStatus,
};
use crate::models::DatedItem;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemFilter {
    #[default]
    All,
    Expired,
    ExpiringSoon,
    Normal,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Alphabetical,
    ExpirationDate,
}

#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub filter: ItemFilter,
    pub sort: SortMode,
    pub threshold_days: u32,
}

/// An item as shown in a fridge listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListedItem {
    #[serde(flatten)]
    pub item: DatedItem,
    pub status: ExpiryStatus,
    pub days_until_expiration: Option<i64>,
}

impl ItemFilter {
    pub fn matches(self, item: &DatedItem, today: NaiveDate, threshold_days: u32) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Expired => is_expired(item, today),
            ItemFilter::ExpiringSoon => {
                !is_expired(item, today) && is_expiring_soon(item, today, threshold_days)
            }
            ItemFilter::Normal => {
                !is_expired(item, today) && !is_expiring_soon(item, today, threshold_days)
            }
        }
    }
}

/// Search, filter, then sort. Both sorts are stable.
///
/// Undated (or unparseable) items go last when sorting by expiration date,
/// keeping their incoming order among themselves.
pub fn build_listing(items: &[DatedItem], query: &ListingQuery, today: NaiveDate) -> Vec<DatedItem> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut selected: Vec<DatedItem> = items
        .iter()
        .filter(|item| match &needle {
            Some(n) => item.name.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .filter(|item| query.filter.matches(item, today, query.threshold_days))
        .cloned()
        .collect();

    match query.sort {
        SortMode::Alphabetical => {
            let mut keyed: Vec<(String, DatedItem)> = selected
                .into_iter()
                .map(|item| (item.name.to_lowercase(), item))
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            selected = keyed.into_iter().map(|(_, item)| item).collect();
        }
        SortMode::ExpirationDate => {
            selected.sort_by_key(|item| {
                let date = item.expiration_date.as_deref().and_then(parse_expiration);
                (date.is_none(), date)
            });
        }
    }

    selected
}

pub fn annotate(items: Vec<DatedItem>, today: NaiveDate, threshold_days: u32) -> Vec<ListedItem> {
    items
        .into_iter()
        .map(|item| ListedItem {
            status: classify(&item, today, threshold_days),
            days_until_expiration: days_until_expiration(&item, today),
            item,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::expiry::tests::{day, item};

    fn names(items: &[DatedItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    fn pantry() -> Vec<DatedItem> {
        vec![
            item(1, "Milk", Some("2025-01-04")),
            item(2, "yogurt", Some("2025-01-05")),
            item(3, "Cheese", Some("2025-01-08")),
            item(4, "butter", Some("2025-02-01")),
            item(5, "Jam", None),
            item(6, "Eggs", Some("not a date")),
            item(7, "Ham", Some("2024-12-25")),
        ]
    }

    #[test]
    fn test_alphabetical_is_case_insensitive() {
        let items = vec![
            item(1, "banana", None),
            item(2, "Apple", None),
            item(3, "cherry", None),
        ];
        let out = build_listing(&items, &ListingQuery::default(), day("2025-01-05"));
        assert_eq!(names(&out), vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_alphabetical_is_stable_for_equal_keys() {
        let items = vec![item(1, "milk", None), item(2, "Milk", None), item(3, "MILK", None)];
        let out = build_listing(&items, &ListingQuery::default(), day("2025-01-05"));
        let ids: Vec<i64> = out.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_date_sort_puts_undated_last() {
        let query = ListingQuery {
            sort: SortMode::ExpirationDate,
            ..Default::default()
        };
        let out = build_listing(&pantry(), &query, day("2025-01-05"));
        assert_eq!(
            names(&out),
            vec!["Ham", "Milk", "yogurt", "Cheese", "butter", "Jam", "Eggs"]
        );
    }

    #[test]
    fn test_filters_partition_all() {
        let items = pantry();
        for today in ["2024-12-01", "2025-01-05", "2025-01-08", "2025-03-01"] {
            for threshold in [0, 1, 3, 30] {
                let run = |filter| {
                    let query = ListingQuery {
                        filter,
                        threshold_days: threshold,
                        ..Default::default()
                    };
                    build_listing(&items, &query, day(today))
                        .into_iter()
                        .map(|i| i.id)
                        .collect::<Vec<_>>()
                };
                let mut all = run(ItemFilter::All);
                let mut parts = run(ItemFilter::Expired);
                let soon = run(ItemFilter::ExpiringSoon);
                let normal = run(ItemFilter::Normal);
                let total = parts.len() + soon.len() + normal.len();
                parts.extend(soon);
                parts.extend(normal);
                parts.sort_unstable();
                all.sort_unstable();
                assert_eq!(total, all.len(), "overlap at {today} / {threshold}");
                assert_eq!(parts, all, "union mismatch at {today} / {threshold}");
            }
        }
    }

    #[test]
    fn test_expiring_soon_filter() {
        let query = ListingQuery {
            filter: ItemFilter::ExpiringSoon,
            threshold_days: 3,
            ..Default::default()
        };
        let out = build_listing(&pantry(), &query, day("2025-01-05"));
        assert_eq!(names(&out), vec!["Cheese", "yogurt"]);
    }

    #[test]
    fn test_search_applies_before_filter() {
        let query = ListingQuery {
            search: Some("  M ".into()),
            filter: ItemFilter::Expired,
            ..Default::default()
        };
        let out = build_listing(&pantry(), &query, day("2025-01-05"));
        assert_eq!(names(&out), vec!["Ham", "Milk"]);
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let query = ListingQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(build_listing(&pantry(), &query, day("2025-01-05")).len(), 7);
    }

    #[test]
    fn test_annotate_reports_status() {
        let listed = annotate(pantry(), day("2025-01-05"), 3);
        assert_eq!(listed[0].status, ExpiryStatus::Expired);
        assert_eq!(listed[1].status, ExpiryStatus::ExpiringSoon);
        assert_eq!(listed[1].days_until_expiration, Some(0));
        assert_eq!(listed[5].status, ExpiryStatus::Normal);
        assert_eq!(listed[5].days_until_expiration, None);
    }
}
