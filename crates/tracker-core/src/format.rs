use chrono::NaiveDate;

/// Formats currency amounts for presentation.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: f64, currency: &str) -> String;
}

/// Formats dates for presentation.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, date: NaiveDate) -> String;
}

/// en-US style money: `$1,234.56`, `-$5.00`. Non-USD codes are prefixed
/// with the code instead of a symbol (`EUR 10.00`).
#[derive(Debug, Default, Clone, Copy)]
pub struct UsdFormatter;

impl CurrencyFormatter for UsdFormatter {
    fn format_amount(&self, amount: f64, currency: &str) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        let cents = (amount.abs() * 100.0).round() as u64;
        let whole = group_thousands(cents / 100);
        let body = format!("{}.{:02}", whole, cents % 100);
        let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
        match currency.trim().to_ascii_uppercase().as_str() {
            "" | "USD" => format!("{}${}", sign, body),
            code => format!("{}{} {}", sign, code, body),
        }
    }
}

/// `January 5, 2024`
#[derive(Debug, Default, Clone, Copy)]
pub struct LongDateFormatter;

impl DateFormatter for LongDateFormatter {
    fn format_date(&self, date: NaiveDate) -> String {
        tracker_domain::dates::long_date_label(date)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human readable byte count with up to two decimals: `0 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".into();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, SIZE_UNITS[unit])
}

/// `42.5%` style label with one decimal.
pub fn format_percentage(value: f64) -> String {
    if value.is_finite() {
        format!("{:.1}%", value)
    } else {
        "0.0%".into()
    }
}
