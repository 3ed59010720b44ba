//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a timestamp as a short date, e.g. "10 Jan 2026".
///
/// Usage in templates: `{{ shop.created_at|short_date }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn short_date(
    value: &chrono::DateTime<chrono::Utc>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(value.format("%-d %b %Y").to_string())
}

/// Formats an amount in rupees with thousands separators, e.g. "Rs 12,500".
///
/// Usage in templates: `{{ shop.challan_amount|rupees }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn rupees(value: &f64, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_rupees(*value))
}

fn format_rupees(value: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = value.trunc().abs() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("Rs {grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rupees_groups_thousands() {
        assert_eq!(format_rupees(1500.0), "Rs 1,500");
        assert_eq!(format_rupees(12500.75), "Rs 12,500");
        assert_eq!(format_rupees(999.0), "Rs 999");
        assert_eq!(format_rupees(1_000_000.0), "Rs 1,000,000");
    }
}
