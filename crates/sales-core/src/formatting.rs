use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format a decimal with thousands separators and a fixed number of
/// fractional digits (half-to-even rounding).
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use sales_core::formatting::format_number;
///
/// assert_eq!(format_number(Decimal::new(12345, 1), 1), "1,234.5");
/// assert_eq!(format_number(Decimal::new(1234567, 0), 0), "1,234,567");
/// assert_eq!(format_number(Decimal::ZERO, 2), "0.00");
/// assert_eq!(format_number(Decimal::new(-98765, 1), 1), "-9,876.5");
/// ```
pub fn format_number(value: Decimal, decimals: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(decimals);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();

    let (int_str, frac_str) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let grouped = group_thousands(int_str);
    let result = match frac_str {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a monetary amount as a USD string with two decimal places and
/// thousands separators.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use sales_core::formatting::format_currency;
///
/// assert_eq!(format_currency(Decimal::new(123456, 2)), "$1,234.56");
/// assert_eq!(format_currency(Decimal::ZERO), "$0.00");
/// assert_eq!(format_currency(Decimal::new(-999, 2)), "$-9.99");
/// ```
pub fn format_currency(amount: Decimal) -> String {
    format!("${}", format_number(amount, 2))
}

/// Format a percent change with an explicit sign and one decimal place.
///
/// ```
/// use rust_decimal::Decimal;
/// use sales_core::formatting::format_percent_change;
///
/// assert_eq!(format_percent_change(Decimal::new(1234, 2)), "+12.3%");
/// assert_eq!(format_percent_change(Decimal::new(-505, 2)), "-5.0%");
/// assert_eq!(format_percent_change(Decimal::ZERO), "+0.0%");
/// ```
pub fn format_percent_change(percent: Decimal) -> String {
    let rounded = percent.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        '-'
    } else {
        '+'
    };
    format!("{}{}%", sign, format_number(rounded.abs(), 1))
}

/// Long-form date used on the dashboard, e.g. `"Jan 15, 2021"`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// `"Jan 10, 2021 to Jan 20, 2021"`, or `"No data"` for an empty dataset.
pub fn format_date_range(range: Option<(NaiveDate, NaiveDate)>) -> String {
    match range {
        Some((start, end)) => format!("{} to {}", format_date(start), format_date(end)),
        None => "No data".to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(Decimal::ZERO, 0), "0");
        assert_eq!(format_number(Decimal::ZERO, 2), "0.00");
    }

    #[test]
    fn test_format_number_no_thousands() {
        assert_eq!(format_number(dec("123.456"), 2), "123.46");
    }

    #[test]
    fn test_format_number_millions() {
        assert_eq!(format_number(dec("1234567"), 0), "1,234,567");
    }

    #[test]
    fn test_format_number_exact_thousands() {
        assert_eq!(format_number(dec("1000"), 0), "1,000");
    }

    #[test]
    fn test_format_number_pads_fraction() {
        assert_eq!(format_number(dec("7"), 2), "7.00");
        assert_eq!(format_number(dec("7.1"), 2), "7.10");
    }

    #[test]
    fn test_format_number_half_even() {
        assert_eq!(format_number(dec("1.005"), 2), "1.00");
        assert_eq!(format_number(dec("1.015"), 2), "1.02");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero() {
        assert_eq!(format_number(dec("-0.001"), 2), "0.00");
    }

    // ── format_currency ──────────────────────────────────────────────────────

    #[test]
    fn test_format_currency_positive() {
        assert_eq!(format_currency(dec("1234.56")), "$1,234.56");
    }

    #[test]
    fn test_format_currency_large() {
        assert_eq!(format_currency(dec("1000000")), "$1,000,000.00");
    }

    #[test]
    fn test_format_currency_long_fraction() {
        assert_eq!(format_currency(dec("3333.333333333333")), "$3,333.33");
    }

    // ── format_percent_change ────────────────────────────────────────────────

    #[test]
    fn test_format_percent_change_signs() {
        assert_eq!(format_percent_change(dec("55.55")), "+55.6%");
        assert_eq!(format_percent_change(dec("-12.34")), "-12.3%");
    }

    #[test]
    fn test_format_percent_change_tiny_negative_is_plus_zero() {
        assert_eq!(format_percent_change(dec("-0.04")), "+0.0%");
    }

    #[test]
    fn test_format_percent_change_large() {
        assert_eq!(format_percent_change(dec("1500")), "+1,500.0%");
    }

    // ── dates ────────────────────────────────────────────────────────────────

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2021, 1, 5).unwrap();
        assert_eq!(format_date(d), "Jan 05, 2021");
    }

    #[test]
    fn test_format_date_range() {
        let start = NaiveDate::from_ymd_opt(2021, 1, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 20).unwrap();
        assert_eq!(
            format_date_range(Some((start, end))),
            "Jan 10, 2021 to Jan 20, 2021"
        );
        assert_eq!(format_date_range(None), "No data");
    }

    // ── group_thousands (via format_number) ──────────────────────────────────

    #[test]
    fn test_group_thousands_one_digit() {
        assert_eq!(format_number(dec("5"), 0), "5");
    }

    #[test]
    fn test_group_thousands_four_digits() {
        assert_eq!(format_number(dec("1234"), 0), "1,234");
    }
}
