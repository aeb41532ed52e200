//! Expense records derived from invoices, plus the query vocabulary used to
//! group, filter and sort them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::*;

/// A product line nested inside an expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Product {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "Product::default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
            item_type: None,
        }
    }

    pub fn default_quantity() -> u32 {
        1
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// One normalized purchase record. `date` keeps the display string the API
/// sent; it is parsed on demand with [`crate::dates::parse_purchase_date`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseItem {
    pub id: i64,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub credit_card: String,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ExpenseItem {
    pub fn new(id: i64, store: impl Into<String>, total: f64) -> Self {
        Self {
            id,
            store: store.into(),
            total,
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_card(mut self, card: impl Into<String>) -> Self {
        self.credit_card = card.into();
        self
    }

    pub fn with_order_number(mut self, order_number: impl Into<String>) -> Self {
        self.order_number = order_number.into();
        self
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn parsed_date(&self) -> Option<chrono::NaiveDate> {
        crate::dates::parse_purchase_date(&self.date)
    }
}

impl Identifiable for ExpenseItem {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Amounted for ExpenseItem {
    fn amount(&self) -> f64 {
        self.total
    }
}

/// A bucket of expenses sharing a grouping key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExpenseGroup {
    pub name: String,
    #[serde(default)]
    pub items: Vec<ExpenseItem>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub total: f64,
}

impl ExpenseGroup {
    /// Builds a group with `count` and `total` derived from `items`.
    pub fn from_items(name: impl Into<String>, items: Vec<ExpenseItem>) -> Self {
        let total = items.iter().map(|item| item.total).sum();
        Self {
            name: name.into(),
            count: items.len(),
            total,
            items,
        }
    }

    pub fn push(&mut self, item: ExpenseItem) {
        self.total += item.total;
        self.count += 1;
        self.items.push(item);
    }
}

impl NamedEntity for ExpenseGroup {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Amounted for ExpenseGroup {
    fn amount(&self) -> f64 {
        self.total
    }
}

/// Grouping dimension for the expense tracker view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum GroupBy {
    #[default]
    ItemType,
    Store,
    Date,
    Card,
    All,
}

impl GroupBy {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::ItemType => "itemType",
            GroupBy::Store => "store",
            GroupBy::Date => "date",
            GroupBy::Card => "card",
            GroupBy::All => "all",
        }
    }

    /// Maps the wire/view names; anything unrecognised groups everything together.
    pub fn from_name(value: &str) -> Self {
        match value.trim() {
            "itemType" | "item_type" | "category" => GroupBy::ItemType,
            "store" => GroupBy::Store,
            "date" => GroupBy::Date,
            "card" => GroupBy::Card,
            _ => GroupBy::All,
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sortable expense columns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Id,
    Store,
    OrderNumber,
    #[default]
    Date,
    Category,
    CreditCard,
    Total,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Id,
        SortKey::Store,
        SortKey::OrderNumber,
        SortKey::Date,
        SortKey::Category,
        SortKey::CreditCard,
        SortKey::Total,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Store => "store",
            SortKey::OrderNumber => "orderNumber",
            SortKey::Date => "date",
            SortKey::Category => "category",
            SortKey::CreditCard => "creditCard",
            SortKey::Total => "total",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown sort key `{}`", value))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction `{}`", other)),
        }
    }
}

/// Column plus direction. Defaults to newest first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Clicking the active column flips direction; a new column starts ascending.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            Self::new(key, self.direction.toggled())
        } else {
            Self::new(key, SortDirection::Asc)
        }
    }
}

/// Relative purchase-date window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DateFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
}

impl DateFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            DateFilter::All => "all",
            DateFilter::ThreeMonths => "3months",
            DateFilter::SixMonths => "6months",
            DateFilter::OneYear => "1year",
        }
    }

    /// Calendar months covered by the window, `None` for no window.
    pub fn months(self) -> Option<u32> {
        match self {
            DateFilter::All => None,
            DateFilter::ThreeMonths => Some(3),
            DateFilter::SixMonths => Some(6),
            DateFilter::OneYear => Some(12),
        }
    }

    pub fn from_name(value: &str) -> Self {
        match value.trim() {
            "3months" => DateFilter::ThreeMonths,
            "6months" => DateFilter::SixMonths,
            "1year" => DateFilter::OneYear,
            _ => DateFilter::All,
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters, grouping and sort applied by the tracker view, in that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseQuery {
    pub category: Option<String>,
    pub date_filter: DateFilter,
    pub search_term: Option<String>,
    pub group_by: GroupBy,
    pub sort: SortConfig,
}

/// Import/sample expense format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawExpense {
    pub id: i64,
    #[serde(default)]
    pub merchant: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub card_used: String,
    #[serde(default)]
    pub products: Vec<RawProduct>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub shipping: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default = "Product::default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: f64,
}

/// Name plus summed amount, used by the top-N lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedTotal {
    pub name: String,
    pub total: f64,
}

impl NamedTotal {
    pub fn new(name: impl Into<String>, total: f64) -> Self {
        Self {
            name: name.into(),
            total,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ExpenseStatistics {
    pub total: f64,
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Monthly,
    Category,
    Status,
    PaymentMethod,
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "monthly" => Ok(ChartKind::Monthly),
            "category" => Ok(ChartKind::Category),
            "status" => Ok(ChartKind::Status),
            "paymentMethod" | "payment_method" | "payment" => Ok(ChartKind::PaymentMethod),
            other => Err(format!("unknown chart `{}`", other)),
        }
    }
}

/// Data captured by the create/edit expense form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFormData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub credit_card: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(
        default,
        with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<f64>,
    #[serde(default)]
    pub products: Vec<Product>,
}
