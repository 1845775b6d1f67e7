//! Currency parsing and sales arithmetic.
//!
//! Prices arrive as strings such as `"$3.00"`. They are parsed into exact
//! [`Decimal`] values so that `price * quantity` never picks up binary
//! floating-point error, and the product is rounded to cents with
//! round-half-to-even (banker's rounding): `0.125` becomes `0.12` while
//! `0.135` becomes `0.14`.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::RowParseError;
use crate::models::DATE_FORMAT;

/// Number of fractional digits kept in a sales amount.
pub const SALES_SCALE: u32 = 2;

/// Upper bound (`10^15`) on a single row's sales amount.
///
/// Any dataset of fewer than `7.9 * 10^13` rows then sums without
/// overflowing a [`Decimal`].
pub const MAX_SALES: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Optional single leading currency symbol, then either a plain digit run or
/// a correctly grouped `1,234,567` run, then an optional fraction.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[$£€]\s*)?(?P<int>\d{1,3}(?:,\d{3})+|\d+)(?:\.(?P<frac>\d+))?$")
        .expect("price regex is valid")
});

/// Parse a currency-formatted price into a non-negative decimal.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use sales_core::price::parse_price;
///
/// assert_eq!(parse_price("$3.00").unwrap(), Decimal::new(300, 2));
/// assert_eq!(parse_price(" 2.5 ").unwrap(), Decimal::new(25, 1));
/// assert_eq!(parse_price("$1,234.50").unwrap(), Decimal::new(123450, 2));
/// assert!(parse_price("$-1.00").is_err());
/// assert!(parse_price("three dollars").is_err());
/// ```
pub fn parse_price(raw: &str) -> Result<Decimal, RowParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RowParseError::MissingValue("price".to_string()));
    }

    let unsigned = trimmed.trim_start_matches(['$', '£', '€']).trim_start();
    if unsigned.starts_with('-') || trimmed.starts_with('-') {
        return Err(RowParseError::NegativePrice(raw.to_string()));
    }

    let caps = PRICE_RE
        .captures(trimmed)
        .ok_or_else(|| RowParseError::InvalidPrice(raw.to_string()))?;

    let int_part = caps["int"].replace(',', "");
    let literal = match caps.name("frac") {
        Some(frac) => format!("{}.{}", int_part, frac.as_str()),
        None => int_part,
    };

    Decimal::from_str(&literal).map_err(|_| RowParseError::InvalidPrice(raw.to_string()))
}

/// Parse a quantity cell as a signed integer.
///
/// The sign is kept so that the normalization step can report negative
/// quantities distinctly from unparseable ones.
pub fn parse_quantity(raw: &str) -> Result<i64, RowParseError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RowParseError::InvalidQuantity(raw.to_string()))
}

/// Parse a `YYYY-MM-DD` date cell.
pub fn parse_sale_date(raw: &str) -> Result<NaiveDate, RowParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| RowParseError::InvalidDate(raw.to_string()))
}

/// Round an amount to cents, half-to-even.
///
/// ```
/// use rust_decimal::Decimal;
/// use sales_core::price::round_sales;
///
/// assert_eq!(round_sales(Decimal::new(125, 3)), Decimal::new(12, 2));
/// assert_eq!(round_sales(Decimal::new(135, 3)), Decimal::new(14, 2));
/// ```
pub fn round_sales(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SALES_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// `round(price * quantity, 2)`; the quantity must already be non-negative
/// and the result may not exceed [`MAX_SALES`].
pub fn compute_sales(price: Decimal, quantity: i64) -> Result<Decimal, RowParseError> {
    if quantity < 0 {
        return Err(RowParseError::NegativeQuantity(quantity));
    }
    price
        .checked_mul(Decimal::from(quantity))
        .map(round_sales)
        .filter(|sales| *sales <= MAX_SALES)
        .ok_or_else(|| RowParseError::Overflow {
            price: price.to_string(),
            quantity,
        })
}

/// Render a sales amount with exactly two fractional digits (`"6.00"`).
pub fn format_sales_amount(value: Decimal) -> String {
    let mut rounded = round_sales(value);
    rounded.rescale(SALES_SCALE);
    rounded.to_string()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ── parse_price ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_price_dollar_prefix() {
        assert_eq!(parse_price("$3.00").unwrap(), dec("3.00"));
        assert_eq!(parse_price("$0.5").unwrap(), dec("0.5"));
    }

    #[test]
    fn test_parse_price_other_symbols_and_whitespace() {
        assert_eq!(parse_price("£4.20").unwrap(), dec("4.20"));
        assert_eq!(parse_price("€ 7").unwrap(), dec("7"));
        assert_eq!(parse_price("  $2.50  ").unwrap(), dec("2.50"));
    }

    #[test]
    fn test_parse_price_plain_number() {
        assert_eq!(parse_price("12").unwrap(), dec("12"));
        assert_eq!(parse_price("12.345").unwrap(), dec("12.345"));
    }

    #[test]
    fn test_parse_price_thousands_grouping() {
        assert_eq!(parse_price("$1,000").unwrap(), dec("1000"));
        assert_eq!(parse_price("$12,345,678.90").unwrap(), dec("12345678.90"));
    }

    #[test]
    fn test_parse_price_bad_grouping_rejected() {
        assert_eq!(
            parse_price("$1,00").unwrap_err(),
            RowParseError::InvalidPrice("$1,00".to_string())
        );
        assert!(parse_price("$,100").is_err());
    }

    #[test]
    fn test_parse_price_negative() {
        assert_eq!(
            parse_price("-$3.00").unwrap_err(),
            RowParseError::NegativePrice("-$3.00".to_string())
        );
        assert_eq!(
            parse_price("$-3.00").unwrap_err(),
            RowParseError::NegativePrice("$-3.00".to_string())
        );
    }

    #[test]
    fn test_parse_price_garbage() {
        for raw in ["abc", "$", "$$3.00", "3.00$", "$3.", "$.50", "3.0.0", "USD 3"] {
            assert!(
                matches!(parse_price(raw), Err(RowParseError::InvalidPrice(_))),
                "{raw:?} should be an invalid price"
            );
        }
    }

    #[test]
    fn test_parse_price_empty() {
        assert_eq!(
            parse_price("  ").unwrap_err(),
            RowParseError::MissingValue("price".to_string())
        );
    }

    // ── parse_quantity / parse_sale_date ──────────────────────────────────────

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("42").unwrap(), 42);
        assert_eq!(parse_quantity(" -3 ").unwrap(), -3);
        assert!(matches!(
            parse_quantity("4.5"),
            Err(RowParseError::InvalidQuantity(_))
        ));
        assert!(parse_quantity("many").is_err());
    }

    #[test]
    fn test_parse_sale_date() {
        assert_eq!(
            parse_sale_date("2021-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 15).unwrap()
        );
        assert!(matches!(
            parse_sale_date("2021-02-30"),
            Err(RowParseError::InvalidDate(_))
        ));
        assert!(parse_sale_date("15/01/2021").is_err());
    }

    // ── compute_sales / rounding ──────────────────────────────────────────────

    #[test]
    fn test_compute_sales_exact() {
        assert_eq!(compute_sales(dec("2.00"), 3).unwrap(), dec("6.00"));
        assert_eq!(compute_sales(dec("2.50"), 4).unwrap(), dec("10.00"));
        assert_eq!(compute_sales(dec("3.00"), 0).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_compute_sales_avoids_float_error() {
        // 0.1 * 3 is 0.30000000000000004 in binary floating point.
        assert_eq!(compute_sales(dec("0.1"), 3).unwrap(), dec("0.30"));
    }

    #[test]
    fn test_round_sales_half_to_even() {
        assert_eq!(round_sales(dec("0.125")), dec("0.12"));
        assert_eq!(round_sales(dec("0.135")), dec("0.14"));
        assert_eq!(round_sales(dec("2.345")), dec("2.34"));
        assert_eq!(round_sales(dec("2.355")), dec("2.36"));
        assert_eq!(round_sales(dec("2.3451")), dec("2.35"));
    }

    #[test]
    fn test_compute_sales_rounds_half_to_even() {
        assert_eq!(compute_sales(dec("0.125"), 1).unwrap(), dec("0.12"));
        assert_eq!(compute_sales(dec("0.0625"), 2).unwrap(), dec("0.12"));
        assert_eq!(compute_sales(dec("0.0675"), 2).unwrap(), dec("0.14"));
    }

    #[test]
    fn test_compute_sales_negative_quantity() {
        assert_eq!(
            compute_sales(dec("1.00"), -2).unwrap_err(),
            RowParseError::NegativeQuantity(-2)
        );
    }

    #[test]
    fn test_compute_sales_overflow() {
        assert!(matches!(
            compute_sales(Decimal::MAX, 2),
            Err(RowParseError::Overflow { .. })
        ));
    }

    #[test]
    fn test_max_sales_is_one_quadrillion() {
        assert_eq!(MAX_SALES, Decimal::from(1_000_000_000_000_000_i64));
    }

    #[test]
    fn test_compute_sales_above_max_is_overflow() {
        assert_eq!(compute_sales(MAX_SALES, 1).unwrap(), MAX_SALES);
        assert_eq!(
            compute_sales(MAX_SALES, 2).unwrap_err(),
            RowParseError::Overflow {
                price: MAX_SALES.to_string(),
                quantity: 2,
            }
        );
        let huge = parse_price("$50000000000000000000000000000").unwrap();
        assert!(matches!(
            compute_sales(huge, 1),
            Err(RowParseError::Overflow { .. })
        ));
    }

    // ── format_sales_amount ───────────────────────────────────────────────────

    #[test]
    fn test_format_sales_amount_two_digits() {
        assert_eq!(format_sales_amount(dec("6")), "6.00");
        assert_eq!(format_sales_amount(dec("6.5")), "6.50");
        assert_eq!(format_sales_amount(dec("10.00")), "10.00");
        assert_eq!(format_sales_amount(dec("0.125")), "0.12");
    }
}
