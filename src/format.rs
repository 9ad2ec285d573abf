//! Number Formatting
//!
//! German-style amounts: `1.234,50`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount with two decimals, `.` grouping and `,` decimal mark
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let cents = rounded.mantissa();
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}{},{:02}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Parse user input; accepts `1.234,5`, `1234,5` and `1234.5`
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim().trim_end_matches('%').trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };
    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::ZERO), "0,00");
        assert_eq!(format_amount(dec!(1234.5)), "1.234,50");
        assert_eq!(format_amount(dec!(-1234567.891)), "-1.234.567,89");
        assert_eq!(format_amount(dec!(999.999)), "1.000,00");
        assert_eq!(format_amount(dec!(0.005)), "0,01");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1.234,5"), Some(dec!(1234.5)));
        assert_eq!(parse_amount(" 250 "), Some(dec!(250)));
        assert_eq!(parse_amount("12.5"), Some(dec!(12.5)));
        assert_eq!(parse_amount("7,5 %"), Some(dec!(7.5)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }
}
