use chrono::NaiveDate;
use tracker_domain::{
    dates, ExpenseFormData, ExpenseGroup, ExpenseItem, Invoice, InvoiceDraft, InvoiceStatus,
    LineItem, Product, RawExpense, RawProduct,
};

use crate::expense_service::{or_default, UNCATEGORIZED};

const OTHER_BUCKET: &str = "Other";
const UNKNOWN_CARD: &str = "Unknown";

/// Category-keyed buckets that remember insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBuckets {
    entries: Vec<(String, Vec<ExpenseItem>)>,
}

impl CategoryBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, item: ExpenseItem) {
        match self.entries.iter_mut().find(|(name, _)| name == key) {
            Some((_, items)) => items.push(item),
            None => self.entries.push((key.to_string(), vec![item])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[ExpenseItem]> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, items)| items.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ExpenseItem])> {
        self.entries
            .iter()
            .map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All items, bucket by bucket.
    pub fn items(&self) -> Vec<ExpenseItem> {
        self.entries
            .iter()
            .flat_map(|(_, items)| items.iter().cloned())
            .collect()
    }
}

/// Reshapes API and sample payloads into expense records and back.
pub struct TransformService;

impl TransformService {
    /// One expense per invoice, bucketed by the invoice's first category.
    /// `today` fills in missing purchase dates.
    pub fn invoices_to_expense_groups(invoices: &[Invoice], today: NaiveDate) -> CategoryBuckets {
        let mut buckets = CategoryBuckets::new();
        for invoice in invoices {
            let bucket = invoice.primary_category().unwrap_or(OTHER_BUCKET);
            buckets.insert(bucket, Self::invoice_to_expense(invoice, bucket, today));
        }
        buckets
    }

    fn invoice_to_expense(invoice: &Invoice, bucket: &str, today: NaiveDate) -> ExpenseItem {
        let order_number = invoice
            .order_number
            .clone()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| Self::fallback_order_number(bucket, invoice.invoice_id));
        let date = invoice
            .purchase_date
            .clone()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| dates::long_date_label(today));
        let products = invoice
            .items
            .iter()
            .map(|line| Product {
                name: line.product_name.clone(),
                price: line.unit_price,
                quantity: if line.quantity == 0 { 1 } else { line.quantity },
                item_type: Some(
                    line.item_type
                        .clone()
                        .filter(|value| !value.is_empty())
                        .unwrap_or_else(|| bucket.to_string()),
                ),
            })
            .collect();

        ExpenseItem {
            id: invoice.invoice_id,
            store: invoice.merchant_name.clone().unwrap_or_default(),
            order_number,
            date,
            category: invoice
                .primary_category()
                .unwrap_or(UNCATEGORIZED)
                .to_string(),
            credit_card: invoice
                .payment_method
                .clone()
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| UNKNOWN_CARD.to_string()),
            total: invoice.grand_total.unwrap_or(0.0),
            products,
        }
    }

    /// `Order # HOM-007` for invoice 7 in the `Home` bucket.
    pub fn fallback_order_number(bucket: &str, invoice_id: i64) -> String {
        let prefix: String = bucket.chars().take(3).collect::<String>().to_uppercase();
        format!("Order # {}-{:03}", prefix, invoice_id)
    }

    pub fn raw_to_app(raw: &[RawExpense]) -> Vec<ExpenseItem> {
        raw.iter()
            .map(|expense| ExpenseItem {
                id: expense.id,
                store: expense.merchant.clone(),
                order_number: expense.order_number.clone(),
                date: expense.date.clone(),
                category: expense.category.clone(),
                credit_card: expense.card_used.clone(),
                total: expense.total,
                products: expense
                    .products
                    .iter()
                    .map(|product| Product {
                        name: product.name.clone(),
                        price: product.unit_price,
                        quantity: product.quantity,
                        item_type: Some(expense.category.clone()),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Inverse of [`Self::raw_to_app`]. Shipping and tax are not carried by
    /// expense records, so they come back as zero and `subtotal` is recomputed.
    pub fn app_to_raw(items: &[ExpenseItem]) -> Vec<RawExpense> {
        items
            .iter()
            .map(|item| RawExpense {
                id: item.id,
                merchant: item.store.clone(),
                date: item.date.clone(),
                order_number: item.order_number.clone(),
                card_used: item.credit_card.clone(),
                category: item.category.clone(),
                products: item
                    .products
                    .iter()
                    .map(|product| RawProduct {
                        name: product.name.clone(),
                        quantity: product.quantity,
                        unit_price: product.price,
                    })
                    .collect(),
                subtotal: item.products.iter().map(Product::line_total).sum(),
                shipping: 0.0,
                tax: 0.0,
                total: item.total,
            })
            .collect()
    }

    pub fn group_by_category(items: &[ExpenseItem]) -> CategoryBuckets {
        let mut buckets = CategoryBuckets::new();
        for item in items {
            buckets.insert(&or_default(&item.category, UNCATEGORIZED), item.clone());
        }
        buckets
    }

    /// Buckets become groups in insertion order, unsorted.
    pub fn groups_from_map(buckets: &CategoryBuckets) -> Vec<ExpenseGroup> {
        buckets
            .iter()
            .map(|(name, items)| ExpenseGroup::from_items(name, items.to_vec()))
            .collect()
    }

    pub fn process_sample(raw: &[RawExpense]) -> Vec<ExpenseGroup> {
        let items = Self::raw_to_app(raw);
        Self::groups_from_map(&Self::group_by_category(&items))
    }

    pub fn form_to_invoice_draft(form: &ExpenseFormData) -> InvoiceDraft {
        let item_type = or_default(&form.category, UNCATEGORIZED);
        InvoiceDraft {
            merchant_name: form.store.clone(),
            order_number: form.order_number.clone().filter(|value| !value.is_empty()),
            purchase_date: Some(form.date.clone()).filter(|value| !value.is_empty()),
            payment_method: Some(form.credit_card.clone()).filter(|value| !value.is_empty()),
            grand_total: form.total.unwrap_or(0.0),
            status: InvoiceStatus::Open,
            notes: None,
            categories: if form.category.is_empty() {
                Vec::new()
            } else {
                vec![form.category.clone()]
            },
            tags: Vec::new(),
            items: form
                .products
                .iter()
                .map(|product| LineItem {
                    item_id: None,
                    product_name: product.name.clone(),
                    quantity: if product.quantity == 0 { 1 } else { product.quantity },
                    unit_price: product.price,
                    item_type: Some(
                        product
                            .item_type
                            .clone()
                            .filter(|value| !value.is_empty())
                            .unwrap_or_else(|| item_type.clone()),
                    ),
                })
                .collect(),
        }
    }

    /// Pre-fills the expense form from an existing record.
    pub fn expense_to_form(item: &ExpenseItem) -> ExpenseFormData {
        ExpenseFormData {
            id: Some(item.id),
            store: item.store.clone(),
            category: item.category.clone(),
            credit_card: item.credit_card.clone(),
            date: item.date.clone(),
            order_number: Some(item.order_number.clone()).filter(|value| !value.is_empty()),
            total: Some(item.total),
            products: item.products.clone(),
        }
    }
}
