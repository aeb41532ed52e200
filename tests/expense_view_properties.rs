mod common;

use common::{date, expense, fixed_clock};
use tracker_core::{ExpenseService, SummaryService, TransformService, UNKNOWN_STORE};
use tracker_domain::{
    DateFilter, ExpenseItem, ExpenseQuery, GroupBy, RawExpense, RawProduct, SortConfig,
    SortDirection, SortKey,
};

fn sample() -> Vec<ExpenseItem> {
    vec![
        expense(1, "Amazon", "Camera", "2024-06-01", 120.0),
        expense(2, "Costco", "Home", "2024-05-02", 80.0),
        expense(3, "Amazon", "Camera", "March 20, 2024", 15.0),
        expense(4, "Best Buy", "", "2023-11-24", 300.0),
        expense(5, "Target", "Home", "someday", 42.0),
    ]
}

#[test]
fn grouping_by_store_sums_counts_and_totals() {
    let items = vec![
        ExpenseItem::new(1, "A", 10.0),
        ExpenseItem::new(2, "B", 20.0),
        ExpenseItem::new(3, "A", 30.0),
    ];
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
fn every_item_lands_in_exactly_one_group() {
    let items = sample();
    for group_by in [
        GroupBy::ItemType,
        GroupBy::Store,
        GroupBy::Date,
        GroupBy::Card,
        GroupBy::All,
    ] {
        let groups = ExpenseService::group(&items, group_by);
        let count: usize = groups.iter().map(|g| g.count).sum();
        let total: f64 = groups.iter().map(|g| g.total).sum();
        assert_eq!(count, items.len(), "{group_by}");
        assert_eq!(total, SummaryService::filtered_total(&items), "{group_by}");
        assert!(groups.windows(2).all(|pair| pair[0].total >= pair[1].total));
    }
}

#[test]
fn blank_store_groups_under_unknown() {
    let items = vec![ExpenseItem::new(1, "", 5.0)];
    let groups = ExpenseService::group(&items, GroupBy::Store);
    assert_eq!(groups[0].name, UNKNOWN_STORE);
}

#[test]
fn all_category_filter_is_identity() {
    let items = sample();
    assert_eq!(ExpenseService::filter_by_category(&items, "All"), items);
    let home = ExpenseService::filter_by_category(&items, "Home");
    assert_eq!(home.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 5]);
}

#[test]
fn date_window_counts_calendar_months_and_drops_unparseable_dates() {
    let clock = fixed_clock(2024, 6, 15);
    let items = vec![
        expense(1, "A", "x", "2024-03-15", 1.0),
        expense(2, "A", "x", "2024-03-14", 1.0),
        expense(3, "A", "x", "not a date", 1.0),
        expense(4, "A", "x", "June 1, 2024", 1.0),
    ];

    let kept = ExpenseService::filter_by_date(&items, DateFilter::ThreeMonths, &*clock);
    assert_eq!(kept.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 4]);

    let everything = ExpenseService::filter_by_date(&items, DateFilter::All, &*clock);
    assert_eq!(everything.len(), 4);

    assert_eq!(
        ExpenseService::cutoff(DateFilter::OneYear, date(2024, 2, 29)),
        Some(date(2023, 2, 28))
    );
}

#[test]
fn search_is_case_insensitive_across_fields() {
    let items = sample();
    let hits = ExpenseService::filter_by_search_term(&items, "aMaZoN");
    assert_eq!(hits.len(), 2);
    let by_product = ExpenseService::filter_by_search_term(&items, "costco item");
    assert_eq!(by_product[0].id, 2);
    assert_eq!(ExpenseService::filter_by_search_term(&items, ""), items);
}

#[test]
fn sort_is_idempotent_and_reversible_on_distinct_keys() {
    let items = sample();
    for key in SortKey::ALL {
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let config = SortConfig::new(key, direction);
            let once = ExpenseService::sort(&items, config);
            assert_eq!(ExpenseService::sort(&once, config), once, "{key}");
        }
    }

    let asc = ExpenseService::sort(&items, SortConfig::new(SortKey::Total, SortDirection::Asc));
    let mut desc = ExpenseService::sort(&items, SortConfig::new(SortKey::Total, SortDirection::Desc));
    desc.reverse();
    assert_eq!(asc, desc);

    let by_date = ExpenseService::sort(&items, SortConfig::new(SortKey::Date, SortDirection::Asc));
    assert_eq!(by_date[0].id, 5);
    assert_eq!(by_date.last().map(|i| i.id), Some(1));
}

#[test]
fn sort_toggle_flips_direction_then_starts_new_column_ascending() {
    let config = SortConfig::default();
    assert_eq!(config, SortConfig::new(SortKey::Date, SortDirection::Desc));
    let flipped = config.toggle(SortKey::Date);
    assert_eq!(flipped.direction, SortDirection::Asc);
    let fresh = flipped.toggle(SortKey::Store);
    assert_eq!(fresh, SortConfig::new(SortKey::Store, SortDirection::Asc));
}

#[test]
fn top_lists_respect_limit_and_order() {
    let items = sample();
    let top = SummaryService::top_categories(&items, 2);
    assert!(top.len() <= 2);
    assert!(top.windows(2).all(|pair| pair[0].total >= pair[1].total));
    assert!(SummaryService::top_stores(&items, 0).is_empty());
}

#[test]
fn apply_filters_then_groups_then_sorts() {
    let clock = fixed_clock(2024, 6, 15);
    let query = ExpenseQuery {
        category: Some("Camera".into()),
        date_filter: DateFilter::SixMonths,
        search_term: None,
        group_by: GroupBy::All,
        sort: SortConfig::new(SortKey::Total, SortDirection::Asc),
    };
    let groups = ExpenseService::apply(&sample(), &query, &*clock);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "All");
    let ids: Vec<i64> = groups[0].items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[test]
fn raw_round_trip_keeps_fields_and_zeroes_shipping_and_tax() {
    let raw = vec![RawExpense {
        id: 11,
        merchant: "Amazon".into(),
        date: "January 10, 2024".into(),
        order_number: "112-7".into(),
        card_used: "Visa ****1234".into(),
        products: vec![
            RawProduct {
                name: "Tripod".into(),
                quantity: 2,
                unit_price: 20.0,
            },
            RawProduct {
                name: "Lens cap".into(),
                quantity: 1,
                unit_price: 5.5,
            },
        ],
        subtotal: 45.5,
        shipping: 4.99,
        tax: 3.2,
        total: 53.69,
        category: "Camera".into(),
    }];

    let back = TransformService::app_to_raw(&TransformService::raw_to_app(&raw));
    assert_eq!(back.len(), 1);
    let (before, after) = (&raw[0], &back[0]);
    assert_eq!(after.id, before.id);
    assert_eq!(after.merchant, before.merchant);
    assert_eq!(after.date, before.date);
    assert_eq!(after.order_number, before.order_number);
    assert_eq!(after.card_used, before.card_used);
    assert_eq!(after.category, before.category);
    assert_eq!(after.products, before.products);
    assert_eq!(after.total, before.total);
    assert_eq!(after.subtotal, 45.5);
    assert_eq!(after.shipping, 0.0);
    assert_eq!(after.tax, 0.0);
}

#[test]
fn sample_processing_buckets_by_category() {
    let raw = vec![
        RawExpense {
            id: 1,
            merchant: "A".into(),
            total: 10.0,
            category: "Books".into(),
            ..RawExpense::default()
        },
        RawExpense {
            id: 2,
            merchant: "B".into(),
            total: 5.0,
            ..RawExpense::default()
        },
        RawExpense {
            id: 3,
            merchant: "C".into(),
            total: 7.0,
            category: "Books".into(),
            ..RawExpense::default()
        },
    ];
    let groups = TransformService::process_sample(&raw);
    let summary: Vec<(&str, usize, f64)> = groups
        .iter()
        .map(|g| (g.name.as_str(), g.count, g.total))
        .collect();
    assert_eq!(summary, vec![("Books", 2, 17.0), ("Uncategorized", 1, 5.0)]);
}
