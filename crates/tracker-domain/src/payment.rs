use serde::{Deserialize, Serialize};

use crate::common::*;

/// A named payment card with the physical card numbers issued under it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PaymentCard {
    pub card_id: i64,
    pub card_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub card_numbers: Vec<CardNumber>,
}

impl Identifiable for PaymentCard {
    fn id(&self) -> i64 {
        self.card_id
    }
}

impl NamedEntity for PaymentCard {
    fn name(&self) -> &str {
        &self.card_name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CardNumber {
    pub card_number_id: i64,
    pub card_id: i64,
    pub last_four: String,
    /// `MM/YY`
    pub expiration_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

impl Identifiable for CardNumber {
    fn id(&self) -> i64 {
        self.card_number_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPaymentCard {
    pub card_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCardNumber {
    pub card_id: i64,
    pub last_four: String,
    pub expiration_date: String,
}

/// Body of `POST /payments/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPayment {
    pub invoice_id: i64,
    pub card_number_id: i64,
    pub amount: f64,
    pub transaction_id: String,
}
