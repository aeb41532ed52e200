use std::{cmp::Ordering, collections::HashMap};

use tracker_domain::{
    dates, Amounted, ChartKind, ChartPoint, ExpenseItem, ExpenseStatistics, Invoice, NamedTotal,
};

use crate::expense_service::{or_default, UNCATEGORIZED, UNKNOWN_CARD, UNKNOWN_STORE};

pub const DEFAULT_TOP_LIMIT: usize = 3;
const UNKNOWN_METHOD: &str = "Unknown";

/// Aggregate figures for the stats, summary and dashboard views.
pub struct SummaryService;

impl SummaryService {
    pub fn statistics(items: &[ExpenseItem]) -> ExpenseStatistics {
        if items.is_empty() {
            return ExpenseStatistics::default();
        }
        let total: f64 = items.iter().map(|item| item.total).sum();
        let highest = items
            .iter()
            .map(|item| item.total)
            .fold(f64::NEG_INFINITY, f64::max);
        let lowest = items
            .iter()
            .map(|item| item.total)
            .fold(f64::INFINITY, f64::min);
        ExpenseStatistics {
            total,
            average: total / items.len() as f64,
            highest,
            lowest,
            count: items.len(),
        }
    }

    pub fn top_categories(items: &[ExpenseItem], limit: usize) -> Vec<NamedTotal> {
        Self::top_by(items, limit, |item| or_default(&item.category, UNCATEGORIZED))
    }

    pub fn top_stores(items: &[ExpenseItem], limit: usize) -> Vec<NamedTotal> {
        Self::top_by(items, limit, |item| or_default(&item.store, UNKNOWN_STORE))
    }

    pub fn top_payment_methods(items: &[ExpenseItem], limit: usize) -> Vec<NamedTotal> {
        Self::top_by(items, limit, |item| or_default(&item.credit_card, UNKNOWN_CARD))
    }

    fn top_by<F>(items: &[ExpenseItem], limit: usize, key: F) -> Vec<NamedTotal>
    where
        F: Fn(&ExpenseItem) -> String,
    {
        let mut totals = sum_by(items.iter().map(|item| (key(item), item.total)));
        sort_descending(&mut totals, |entry| entry.total);
        totals.truncate(limit);
        totals
    }

    pub fn filtered_total(items: &[ExpenseItem]) -> f64 {
        items.iter().map(Amounted::amount).sum()
    }

    /// `part` as a percentage of `whole`; zero when `whole` is not positive.
    pub fn share_percentage(part: f64, whole: f64) -> f64 {
        if whole > 0.0 {
            part / whole * 100.0
        } else {
            0.0
        }
    }

    pub fn chart_data(invoices: &[Invoice], kind: ChartKind) -> Vec<ChartPoint> {
        match kind {
            ChartKind::Monthly => {
                let mut points: Vec<ChartPoint> = sum_by(invoices.iter().filter_map(|invoice| {
                    let date = invoice
                        .purchase_date
                        .as_deref()
                        .and_then(dates::parse_purchase_date)?;
                    Some((dates::month_key(date), invoice.amount()))
                }))
                .into_iter()
                .map(|entry| ChartPoint::new(entry.name, entry.total))
                .collect();
                points.sort_by(|a, b| a.name.cmp(&b.name));
                points
            }
            ChartKind::Category => {
                let pairs = invoices.iter().flat_map(|invoice| {
                    let names: Vec<String> = if invoice.categories.is_empty() {
                        vec![UNCATEGORIZED.to_string()]
                    } else {
                        invoice.categories.clone()
                    };
                    names.into_iter().map(move |name| (name, invoice.amount()))
                });
                Self::descending_points(pairs)
            }
            ChartKind::Status => sum_by(
                invoices
                    .iter()
                    .map(|invoice| (invoice.status.to_string(), 1.0)),
            )
            .into_iter()
            .map(|entry| ChartPoint::new(entry.name, entry.total))
            .collect(),
            ChartKind::PaymentMethod => Self::descending_points(invoices.iter().map(|invoice| {
                let method = invoice
                    .payment_method
                    .as_deref()
                    .filter(|value| !value.is_empty())
                    .unwrap_or(UNKNOWN_METHOD);
                (method.to_string(), invoice.amount())
            })),
        }
    }

    fn descending_points<I>(pairs: I) -> Vec<ChartPoint>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut totals = sum_by(pairs);
        sort_descending(&mut totals, |entry| entry.total);
        totals
            .into_iter()
            .map(|entry| ChartPoint::new(entry.name, entry.total))
            .collect()
    }
}

/// Sums values per key, preserving first-seen key order.
fn sum_by<I>(pairs: I) -> Vec<NamedTotal>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut totals: Vec<NamedTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (name, value) in pairs {
        match index.get(&name) {
            Some(&position) => totals[position].total += value,
            None => {
                index.insert(name.clone(), totals.len());
                totals.push(NamedTotal::new(name, value));
            }
        }
    }
    totals
}

fn sort_descending<T, F>(entries: &mut [T], value: F)
where
    F: Fn(&T) -> f64,
{
    entries.sort_by(|a, b| {
        value(b)
            .partial_cmp(&value(a))
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_domain::InvoiceStatus;

    fn invoice(id: i64, date: Option<&str>, total: f64, categories: &[&str]) -> Invoice {
        Invoice {
            purchase_date: date.map(str::to_string),
            grand_total: Some(total),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            ..Invoice::new(id)
        }
    }

    #[test]
    fn statistics_of_empty_input_are_zero() {
        assert_eq!(SummaryService::statistics(&[]), ExpenseStatistics::default());
    }

    #[test]
    fn statistics_cover_range_and_mean() {
        let items = vec![
            ExpenseItem::new(1, "A", 10.0),
            ExpenseItem::new(2, "B", 30.0),
            ExpenseItem::new(3, "C", 20.0),
        ];
        let stats = SummaryService::statistics(&items);
        assert_eq!(stats.total, 60.0);
        assert_eq!(stats.average, 20.0);
        assert_eq!(stats.highest, 30.0);
        assert_eq!(stats.lowest, 10.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn top_categories_respect_limit_and_order() {
        let items = vec![
            ExpenseItem::new(1, "A", 5.0).with_category("Home"),
            ExpenseItem::new(2, "B", 50.0).with_category("Camera"),
            ExpenseItem::new(3, "C", 20.0),
            ExpenseItem::new(4, "D", 10.0).with_category("Home"),
        ];
        let top = SummaryService::top_categories(&items, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], NamedTotal::new("Camera", 50.0));
        assert_eq!(top[1], NamedTotal::new("Uncategorized", 20.0));
    }

    #[test]
    fn share_percentage_guards_zero_whole() {
        assert_eq!(SummaryService::share_percentage(5.0, 0.0), 0.0);
        assert_eq!(SummaryService::share_percentage(25.0, 100.0), 25.0);
    }

    #[test]
    fn monthly_chart_skips_undated_and_sorts_ascending() {
        let invoices = vec![
            invoice(1, Some("2024-03-02"), 10.0, &[]),
            invoice(2, Some("January 9, 2024"), 5.0, &[]),
            invoice(3, None, 99.0, &[]),
            invoice(4, Some("2024-03-20"), 2.5, &[]),
        ];
        let points = SummaryService::chart_data(&invoices, ChartKind::Monthly);
        assert_eq!(
            points,
            vec![ChartPoint::new("2024-01", 5.0), ChartPoint::new("2024-03", 12.5)]
        );
    }

    #[test]
    fn category_chart_credits_every_category() {
        let invoices = vec![
            invoice(1, None, 10.0, &["Home", "Office"]),
            invoice(2, None, 4.0, &[]),
        ];
        let points = SummaryService::chart_data(&invoices, ChartKind::Category);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].value, 10.0);
        assert_eq!(points[2], ChartPoint::new("Uncategorized", 4.0));
    }

    #[test]
    fn status_chart_counts_in_first_seen_order() {
        let mut paid = Invoice::new(1);
        paid.status = InvoiceStatus::Paid;
        let open = Invoice::new(2);
        let mut paid_again = Invoice::new(3);
        paid_again.status = InvoiceStatus::Paid;

        let points = SummaryService::chart_data(&[paid, open, paid_again], ChartKind::Status);
        assert_eq!(
            points,
            vec![ChartPoint::new("Paid", 2.0), ChartPoint::new("Open", 1.0)]
        );
    }

    #[test]
    fn payment_method_chart_defaults_to_unknown_and_sorts_descending() {
        let invoice = |id: i64, method: Option<&str>, total: f64| Invoice {
            payment_method: method.map(str::to_string),
            grand_total: Some(total),
            ..Invoice::new(id)
        };
        let invoices = [
            invoice(1, Some("Visa"), 10.0),
            invoice(2, None, 25.0),
            invoice(3, Some("Amex"), 40.0),
            invoice(4, Some(""), 5.0),
            invoice(5, Some("Visa"), 12.5),
        ];

        let points = SummaryService::chart_data(&invoices, ChartKind::PaymentMethod);
        assert_eq!(
            points,
            vec![
                ChartPoint::new("Amex", 40.0),
                ChartPoint::new(UNKNOWN_METHOD, 30.0),
                ChartPoint::new("Visa", 22.5),
            ]
        );
    }
}
