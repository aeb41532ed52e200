use serde_json::json;
use tracker_domain::{CardNumber, NewCardNumber, NewPayment, NewPaymentCard, Payment, PaymentCard};

use super::{ApiClient, ApiError};

impl ApiClient {
    pub fn list_cards(&self) -> Result<Vec<PaymentCard>, ApiError> {
        self.get_json("/payment-cards/", &[])
    }

    pub fn get_card(&self, card_id: i64) -> Result<PaymentCard, ApiError> {
        self.get_json(&format!("/payment-cards/{}", card_id), &[])
    }

    pub fn add_card(&self, card: &NewPaymentCard) -> Result<PaymentCard, ApiError> {
        self.post_json("/payment-cards/", card)
    }

    pub fn rename_card(&self, card_id: i64, card_name: &str) -> Result<PaymentCard, ApiError> {
        self.put_json(
            &format!("/payment-cards/{}", card_id),
            &json!({ "card_name": card_name }),
        )
    }

    pub fn delete_card(&self, card_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/payment-cards/{}", card_id)).map(|_| ())
    }

    pub fn add_card_number(&self, number: &NewCardNumber) -> Result<CardNumber, ApiError> {
        self.post_json(
            &format!("/payment-cards/{}/numbers", number.card_id),
            &json!({
                "last_four": number.last_four,
                "expiration_date": number.expiration_date,
            }),
        )
    }

    pub fn delete_card_number(&self, card_number_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/card-numbers/{}", card_number_id))
            .map(|_| ())
    }

    pub fn make_payment(&self, payment: &NewPayment) -> Result<Payment, ApiError> {
        self.post_json("/payments/", payment)
    }

    pub fn payments_for_invoice(&self, invoice_id: i64) -> Result<Vec<Payment>, ApiError> {
        self.get_json(&format!("/payments/invoice/{}", invoice_id), &[])
    }

    pub fn payments_for_card_number(&self, card_number_id: i64) -> Result<Vec<Payment>, ApiError> {
        self.get_json(&format!("/payments/card-number/{}", card_number_id), &[])
    }
}
