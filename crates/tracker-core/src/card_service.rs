use chrono::{Datelike, NaiveDate};
use tracker_domain::{CardNumber, PaymentCard};

use crate::CoreError;

/// Card-number helpers. Full numbers never leave the client; only the last
/// four digits and the expiry are stored.
pub struct CardService;

impl CardService {
    /// Luhn check over the digits of `number`; 13 to 19 digits required.
    pub fn is_valid_card_number(number: &str) -> bool {
        let digits: Vec<u32> = number.chars().filter_map(|ch| ch.to_digit(10)).collect();
        if !(13..=19).contains(&digits.len()) {
            return false;
        }
        let sum: u32 = digits
            .iter()
            .rev()
            .enumerate()
            .map(|(index, &digit)| {
                if index % 2 == 1 {
                    let doubled = digit * 2;
                    if doubled > 9 {
                        doubled - 9
                    } else {
                        doubled
                    }
                } else {
                    digit
                }
            })
            .sum();
        sum % 10 == 0
    }

    pub fn is_valid_last_four(value: &str) -> bool {
        value.len() == 4 && value.chars().all(|ch| ch.is_ascii_digit())
    }

    pub fn last_four(number: &str) -> Option<String> {
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        if digits.len() < 4 {
            return None;
        }
        Some(digits[digits.len() - 4..].to_string())
    }

    /// Parses `MM/YY` into the last day of that month.
    pub fn parse_expiration(value: &str) -> Result<NaiveDate, CoreError> {
        let invalid = || CoreError::Validation(format!("Expiration `{}` must be MM/YY", value));
        let (month, year) = value.trim().split_once('/').ok_or_else(invalid)?;
        if month.len() != 2 || year.len() != 2 {
            return Err(invalid());
        }
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let first = NaiveDate::from_ymd_opt(2000 + year, month, 1).ok_or_else(invalid)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), month + 1, 1)
        };
        next_month
            .and_then(|date| date.pred_opt())
            .ok_or_else(invalid)
    }

    /// A card stays usable through the last day of its expiry month.
    pub fn is_expired(card: &CardNumber, today: NaiveDate) -> Result<bool, CoreError> {
        Ok(Self::parse_expiration(&card.expiration_date)? < today)
    }

    /// `Chase Sapphire ending in 4242`
    pub fn label(card: &PaymentCard, number: &CardNumber) -> String {
        format!("{} ending in {}", card.card_name, number.last_four)
    }

    /// Every card/number pairing as a payment-method label.
    pub fn payment_method_options(cards: &[PaymentCard]) -> Vec<String> {
        cards
            .iter()
            .flat_map(|card| {
                card.card_numbers
                    .iter()
                    .map(move |number| Self::label(card, number))
            })
            .collect()
    }

    pub fn validate_new_number(last_four: &str, expiration: &str) -> Result<(), CoreError> {
        if !Self::is_valid_last_four(last_four) {
            return Err(CoreError::Validation(
                "Last four digits must be exactly 4 digits".into(),
            ));
        }
        Self::parse_expiration(expiration).map(|_| ())
    }
}
