use once_cell::sync::Lazy;
use regex::Regex;
use tracker_domain::ExpenseFormData;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub const MIN_PASSWORD_LEN: usize = 8;

/// Form and credential checks run before anything is sent to the API.
pub struct ValidationService;

impl ValidationService {
    pub fn is_valid_email(email: &str) -> bool {
        EMAIL.is_match(email.trim())
    }

    /// First failed password rule, or `None` when the password is acceptable.
    pub fn password_problem(password: &str) -> Option<&'static str> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Some("Password must be at least 8 characters long");
        }
        if !password.chars().any(|ch| ch.is_ascii_uppercase()) {
            return Some("Password must contain at least one uppercase letter");
        }
        if !password.chars().any(|ch| ch.is_ascii_lowercase()) {
            return Some("Password must contain at least one lowercase letter");
        }
        if !password.chars().any(|ch| ch.is_ascii_digit()) {
            return Some("Password must contain at least one number");
        }
        if password.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Some("Password must contain at least one special character");
        }
        None
    }

    /// Inline messages for the expense form, one per failing rule.
    pub fn validate_expense_form(form: &ExpenseFormData) -> Vec<String> {
        let mut errors = Vec::new();
        if form.store.trim().is_empty() {
            errors.push("Please enter a merchant name".to_string());
        }
        if form.total.is_some_and(|total| !total.is_finite() || total < 0.0) {
            errors.push("Please enter a valid total".to_string());
        }
        if form.products.iter().any(|p| p.name.trim().is_empty()) {
            errors.push("Please enter a product name".to_string());
        }
        if form
            .products
            .iter()
            .any(|p| !p.price.is_finite() || p.price < 0.0)
        {
            errors.push("Please enter a valid price".to_string());
        }
        if form.products.iter().any(|p| p.quantity == 0) {
            errors.push("Please enter a valid quantity".to_string());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_domain::Product;

    #[test]
    fn email_shape() {
        assert!(ValidationService::is_valid_email("ana@example.com"));
        assert!(!ValidationService::is_valid_email("ana@example"));
        assert!(!ValidationService::is_valid_email("ana example@x.io"));
    }

    #[test]
    fn password_rules_report_first_failure() {
        assert_eq!(
            ValidationService::password_problem("short"),
            Some("Password must be at least 8 characters long")
        );
        assert_eq!(
            ValidationService::password_problem("alllowercase1!"),
            Some("Password must contain at least one uppercase letter")
        );
        assert_eq!(
            ValidationService::password_problem("NoSpecial123"),
            Some("Password must contain at least one special character")
        );
        assert_eq!(ValidationService::password_problem("Str0ng!pass"), None);
    }

    #[test]
    fn expense_form_flags_bad_products() {
        let form = ExpenseFormData {
            store: "Costco".into(),
            products: vec![Product::new("", -1.0, 0)],
            ..ExpenseFormData::default()
        };
        assert_eq!(
            ValidationService::validate_expense_form(&form),
            vec![
                "Please enter a product name",
                "Please enter a valid price",
                "Please enter a valid quantity",
            ]
        );
    }
}
