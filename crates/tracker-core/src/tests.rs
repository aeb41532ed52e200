use chrono::NaiveDate;

use crate::{
    expense_service::ExpenseService, summary_service::SummaryService, time::FixedClock,
    transform_service::TransformService,
};
use tracker_domain::{
    DateFilter, ExpenseQuery, GroupBy, Invoice, LineItem, SortConfig, SortDirection, SortKey,
};

fn invoice(id: i64, merchant: &str, date: &str, total: f64, category: Option<&str>) -> Invoice {
    Invoice {
        merchant_name: Some(merchant.into()),
        purchase_date: Some(date.into()),
        grand_total: Some(total),
        categories: category.map(|c| vec![c.to_string()]).unwrap_or_default(),
        items: vec![LineItem::new(format!("{} item", merchant), 1, total)],
        ..Invoice::new(id)
    }
}

fn invoices() -> Vec<Invoice> {
    vec![
        invoice(1, "Amazon", "January 10, 2024", 120.0, Some("Camera")),
        invoice(2, "Costco", "2024-05-02", 80.0, Some("Home")),
        invoice(3, "Amazon", "2024-06-01", 15.0, Some("Camera")),
        invoice(4, "Best Buy", "2023-11-24", 300.0, None),
    ]
}

#[test]
fn invoice_pipeline_feeds_tracker_view() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let clock = FixedClock::on(today);
    let buckets = TransformService::invoices_to_expense_groups(&invoices(), today);
    let items = buckets.items();
    assert_eq!(items.len(), 4);

    let query = ExpenseQuery {
        date_filter: DateFilter::SixMonths,
        group_by: GroupBy::Store,
        sort: SortConfig::new(SortKey::Total, SortDirection::Desc),
        ..ExpenseQuery::default()
    };
    let groups = ExpenseService::apply(&items, &query, &clock);

    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Amazon", "Costco"]);
    assert_eq!(groups[0].items[0].total, 120.0);
    assert_eq!(groups[0].items[1].total, 15.0);

    let flat = ExpenseService::flatten(&groups);
    let stats = SummaryService::statistics(&flat);
    assert_eq!(stats.count, 3);
    assert_eq!(stats.total, 215.0);
}

#[test]
fn category_filter_all_is_identity() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let items = TransformService::invoices_to_expense_groups(&invoices(), today).items();
    assert_eq!(ExpenseService::filter_by_category(&items, "All"), items);
    assert_eq!(ExpenseService::filter_by_category(&items, ""), items);
    assert_eq!(ExpenseService::filter_by_category(&items, "Camera").len(), 2);
}

#[test]
fn sorting_is_idempotent_and_direction_reverses_distinct_keys() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let items = TransformService::invoices_to_expense_groups(&invoices(), today).items();

    for key in SortKey::ALL {
        let asc = ExpenseService::sort(&items, SortConfig::new(key, SortDirection::Asc));
        let again = ExpenseService::sort(&asc, SortConfig::new(key, SortDirection::Asc));
        assert_eq!(asc, again, "sort by {key} is not idempotent");
    }

    let asc = ExpenseService::sort(&items, SortConfig::new(SortKey::Total, SortDirection::Asc));
    let mut desc =
        ExpenseService::sort(&items, SortConfig::new(SortKey::Total, SortDirection::Desc));
    desc.reverse();
    assert_eq!(asc, desc);
}

#[test]
fn top_lists_never_exceed_limit_and_are_non_increasing() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let items = TransformService::invoices_to_expense_groups(&invoices(), today).items();
    for limit in 0..5 {
        let top = SummaryService::top_categories(&items, limit);
        assert!(top.len() <= limit);
        assert!(top.windows(2).all(|pair| pair[0].total >= pair[1].total));
    }
    let stores = SummaryService::top_stores(&items, 3);
    assert_eq!(stores[0].name, "Best Buy");
    let cards = SummaryService::top_payment_methods(&items, 3);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "Unknown");
}
