use std::{cmp::Ordering, collections::HashMap};

use chrono::{Months, NaiveDate};
use tracing::debug;
use tracker_domain::{
    dates, DateFilter, ExpenseGroup, ExpenseItem, ExpenseQuery, GroupBy, SortConfig,
    SortDirection, SortKey,
};

use crate::time::Clock;

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const UNKNOWN_STORE: &str = "Unknown Store";
pub const UNKNOWN_DATE: &str = "Unknown Date";
pub const UNKNOWN_CARD: &str = "Unknown Card";
pub const ALL_GROUP: &str = "All";

/// Grouping, filtering and sorting over expense lists. Every operation is
/// total: malformed values fall back to default labels instead of failing.
pub struct ExpenseService;

impl ExpenseService {
    /// Buckets items by the chosen dimension. Groups keep first-seen order
    /// and are then stably sorted by total, largest first.
    pub fn group(items: &[ExpenseItem], group_by: GroupBy) -> Vec<ExpenseGroup> {
        let mut groups: Vec<ExpenseGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for item in items {
            let key = Self::group_label(item, group_by);
            match index.get(&key) {
                Some(&position) => groups[position].push(item.clone()),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(ExpenseGroup::from_items(key, vec![item.clone()]));
                }
            }
        }

        groups.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
        groups
    }

    /// Label of the bucket `item` lands in for `group_by`.
    pub fn group_label(item: &ExpenseItem, group_by: GroupBy) -> String {
        match group_by {
            GroupBy::ItemType => or_default(&item.category, UNCATEGORIZED),
            GroupBy::Store => or_default(&item.store, UNKNOWN_STORE),
            GroupBy::Date => item
                .parsed_date()
                .map(dates::month_year_label)
                .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            GroupBy::Card => or_default(&item.credit_card, UNKNOWN_CARD),
            GroupBy::All => ALL_GROUP.to_string(),
        }
    }

    pub fn filter_by_category(items: &[ExpenseItem], category: &str) -> Vec<ExpenseItem> {
        if category.is_empty() || category == ALL_GROUP {
            return items.to_vec();
        }
        items
            .iter()
            .filter(|item| item.category == category)
            .cloned()
            .collect()
    }

    /// Keeps items purchased on or after `today - window`. Items whose date
    /// cannot be parsed are dropped by any window other than `All`.
    /// Dates carry no time of day, so an item dated on the cutoff day is kept.
    pub fn filter_by_date(
        items: &[ExpenseItem],
        filter: DateFilter,
        clock: &dyn Clock,
    ) -> Vec<ExpenseItem> {
        match Self::cutoff(filter, clock.today()) {
            Some(cutoff) => items
                .iter()
                .filter(|item| item.parsed_date().is_some_and(|date| date >= cutoff))
                .cloned()
                .collect(),
            None => items.to_vec(),
        }
    }

    /// First day inside the window, `None` when the filter keeps everything.
    pub fn cutoff(filter: DateFilter, today: NaiveDate) -> Option<NaiveDate> {
        filter
            .months()
            .and_then(|months| today.checked_sub_months(Months::new(months)))
    }

    /// Case-insensitive substring match over store, order number, category,
    /// card and product names.
    pub fn filter_by_search_term(items: &[ExpenseItem], term: &str) -> Vec<ExpenseItem> {
        if term.is_empty() {
            return items.to_vec();
        }
        let needle = term.to_lowercase();
        items
            .iter()
            .filter(|item| Self::matches_search(item, &needle))
            .cloned()
            .collect()
    }

    fn matches_search(item: &ExpenseItem, needle: &str) -> bool {
        let hit = |value: &str| value.to_lowercase().contains(needle);
        hit(&item.store)
            || hit(&item.order_number)
            || hit(&item.category)
            || hit(&item.credit_card)
            || item.products.iter().any(|product| hit(&product.name))
    }

    /// Stable sort. `Desc` reverses the comparator, so equal keys keep
    /// their input order in both directions.
    pub fn sort(items: &[ExpenseItem], config: SortConfig) -> Vec<ExpenseItem> {
        let mut sorted = items.to_vec();
        sorted.sort_by(|a, b| {
            let ordering = Self::compare(a, b, config.key);
            match config.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        sorted
    }

    fn compare(a: &ExpenseItem, b: &ExpenseItem, key: SortKey) -> Ordering {
        match key {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Total => a.total.total_cmp(&b.total),
            SortKey::Date => a.parsed_date().cmp(&b.parsed_date()),
            SortKey::Store => cmp_text(&a.store, &b.store),
            SortKey::OrderNumber => cmp_text(&a.order_number, &b.order_number),
            SortKey::Category => cmp_text(&a.category, &b.category),
            SortKey::CreditCard => cmp_text(&a.credit_card, &b.credit_card),
        }
    }

    /// Category, date and search filters, then grouping, then sorting inside
    /// each group.
    pub fn apply(
        items: &[ExpenseItem],
        query: &ExpenseQuery,
        clock: &dyn Clock,
    ) -> Vec<ExpenseGroup> {
        let filtered = Self::filter_by_category(items, query.category.as_deref().unwrap_or(""));
        let filtered = Self::filter_by_date(&filtered, query.date_filter, clock);
        let filtered =
            Self::filter_by_search_term(&filtered, query.search_term.as_deref().unwrap_or(""));

        let groups = Self::group(&filtered, query.group_by)
            .into_iter()
            .map(|group| ExpenseGroup {
                items: Self::sort(&group.items, query.sort),
                ..group
            })
            .collect::<Vec<_>>();
        debug!(
            input = items.len(),
            kept = filtered.len(),
            groups = groups.len(),
            group_by = %query.group_by,
            "applied expense query"
        );
        groups
    }

    pub fn flatten(groups: &[ExpenseGroup]) -> Vec<ExpenseItem> {
        groups
            .iter()
            .flat_map(|group| group.items.iter().cloned())
            .collect()
    }

    /// Distinct non-empty categories in first-seen order.
    pub fn categories(items: &[ExpenseItem]) -> Vec<String> {
        let mut seen = Vec::new();
        for item in items {
            if !item.category.is_empty() && !seen.contains(&item.category) {
                seen.push(item.category.clone());
            }
        }
        seen
    }
}

pub(crate) fn or_default(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    fn item(id: i64, store: &str, total: f64) -> ExpenseItem {
        ExpenseItem::new(id, store, total)
    }

    #[test]
    fn groups_by_store_and_orders_by_total() {
        let items = vec![item(1, "A", 10.0), item(2, "B", 20.0), item(3, "A", 30.0)];
        let groups = ExpenseService::group(&items, GroupBy::Store);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "A");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].total, 40.0);
        assert_eq!(groups[1].name, "B");
        assert_eq!(groups[1].count, 1);
        assert_eq!(groups[1].total, 20.0);
    }

    #[test]
    fn group_labels_fall_back_for_missing_values() {
        let blank = item(1, "", 5.0);
        assert_eq!(ExpenseService::group_label(&blank, GroupBy::ItemType), UNCATEGORIZED);
        assert_eq!(ExpenseService::group_label(&blank, GroupBy::Store), UNKNOWN_STORE);
        assert_eq!(ExpenseService::group_label(&blank, GroupBy::Card), UNKNOWN_CARD);
        assert_eq!(ExpenseService::group_label(&blank, GroupBy::Date), UNKNOWN_DATE);
        assert_eq!(ExpenseService::group_label(&blank, GroupBy::All), ALL_GROUP);

        let dated = item(2, "X", 1.0).with_date("2024-01-15");
        assert_eq!(ExpenseService::group_label(&dated, GroupBy::Date), "January 2024");
    }

    #[test]
    fn equal_group_totals_keep_first_seen_order() {
        let items = vec![item(1, "First", 10.0), item(2, "Second", 10.0)];
        let groups = ExpenseService::group(&items, GroupBy::Store);
        assert_eq!(groups[0].name, "First");
        assert_eq!(groups[1].name, "Second");
    }

    #[test]
    fn date_filter_uses_calendar_months_from_clock() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        let items = vec![
            item(1, "A", 1.0).with_date("2024-03-15"),
            item(2, "B", 1.0).with_date("2024-03-14"),
            item(3, "C", 1.0).with_date("not a date"),
        ];

        let kept = ExpenseService::filter_by_date(&items, DateFilter::ThreeMonths, &clock);
        assert_eq!(kept.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);

        let all = ExpenseService::filter_by_date(&items, DateFilter::All, &clock);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn search_matches_product_names_case_insensitively() {
        let items = vec![
            item(1, "Target", 1.0).with_products(vec![tracker_domain::Product::new(
                "USB Cable", 5.0, 1,
            )]),
            item(2, "Costco", 1.0),
        ];
        let hits = ExpenseService::filter_by_search_term(&items, "usb");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
        assert_eq!(ExpenseService::filter_by_search_term(&items, "").len(), 2);
    }

    #[test]
    fn sort_places_unparseable_dates_first_when_ascending() {
        let items = vec![
            item(1, "A", 1.0).with_date("2024-02-01"),
            item(2, "B", 1.0).with_date("garbage"),
            item(3, "C", 1.0).with_date("January 3, 2024"),
        ];
        let asc = ExpenseService::sort(&items, SortConfig::new(SortKey::Date, SortDirection::Asc));
        assert_eq!(asc.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn store_sort_ignores_case() {
        let items = vec![item(1, "beta", 1.0), item(2, "Alpha", 1.0)];
        let sorted =
            ExpenseService::sort(&items, SortConfig::new(SortKey::Store, SortDirection::Asc));
        assert_eq!(sorted[0].store, "Alpha");
    }
}
