//! Invoice records as returned by the `/invoices/` endpoints.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::*;

/// Workflow state of an invoice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum InvoiceStatus {
    #[default]
    Open,
    Paid,
    Draft,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    Resolved,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Open,
        InvoiceStatus::Paid,
        InvoiceStatus::Draft,
        InvoiceStatus::NeedsAttention,
        InvoiceStatus::Resolved,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Open => "Open",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::NeedsAttention => "Needs Attention",
            InvoiceStatus::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.label().to_ascii_lowercase() == normalized)
            .ok_or_else(|| format!("unknown invoice status `{}`", value))
    }
}

/// A purchased product line on an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default = "LineItem::default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
}

impl LineItem {
    pub fn new(product_name: impl Into<String>, quantity: u32, unit_price: f64) -> Self {
        Self {
            item_id: None,
            product_name: product_name.into(),
            quantity,
            unit_price,
            item_type: None,
        }
    }

    pub fn default_quantity() -> u32 {
        1
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Settlement of an invoice against a stored card number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub payment_id: i64,
    pub invoice_id: i64,
    #[serde(default)]
    pub card_number_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub payment_date: String,
}

/// Invoice header plus its nested line items, categories and tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Invoice {
    pub invoice_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(
        default,
        with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub grand_total: Option<f64>,
    #[serde(
        default,
        with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub shipping_handling: Option<f64>,
    #[serde(
        default,
        with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl Invoice {
    pub fn new(invoice_id: i64) -> Self {
        Self {
            invoice_id,
            ..Self::default()
        }
    }

    /// First category, used as the invoice's primary bucket.
    pub fn primary_category(&self) -> Option<&str> {
        self.categories
            .first()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}

impl Identifiable for Invoice {
    fn id(&self) -> i64 {
        self.invoice_id
    }
}

impl Amounted for Invoice {
    fn amount(&self) -> f64 {
        self.grand_total.unwrap_or(0.0)
    }
}

impl Displayable for Invoice {
    fn display_label(&self) -> String {
        let merchant = self.merchant_name.as_deref().unwrap_or("Unknown merchant");
        match self.order_number.as_deref() {
            Some(order) => format!("{} #{} ({})", merchant, order, self.status),
            None => format!("{} ({})", merchant, self.status),
        }
    }
}

/// Payload for creating or replacing an invoice via `/add-entry/` or `/update/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InvoiceDraft {
    pub merchant_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub grand_total: f64,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Acknowledgement returned by invoice mutations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceMutation {
    #[serde(default)]
    pub invoice_id: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_display_strings_on_the_wire() {
        let json = serde_json::to_string(&InvoiceStatus::NeedsAttention).unwrap();
        assert_eq!(json, "\"Needs Attention\"");
        assert_eq!(
            "needs_attention".parse::<InvoiceStatus>().unwrap(),
            InvoiceStatus::NeedsAttention
        );
        assert!("archived".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn invoice_decodes_sparse_payloads() {
        let json = r#"{
            "invoice_id": 7,
            "merchant_name": "Amazon",
            "grand_total": "42.10",
            "status": "Paid",
            "items": [{"product_name": "Cable", "unit_price": 9.5}]
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.grand_total, Some(42.10));
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.items[0].quantity, 1);
        assert!(invoice.categories.is_empty());
        assert_eq!(invoice.primary_category(), None);
    }
}
