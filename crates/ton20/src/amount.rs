//! Token amounts.
//!
//! Amounts are integers in nano-units (10^-9 of the display unit). User input
//! is either a decimal string in display units or a raw nano integer; both are
//! converted exactly, without going through floating point.

use crate::error::{Ton20Error, Ton20Result};

/// Token amount in nano-units.
pub type Amount = u128;

/// Number of fractional digits between display units and nano-units.
pub const NANO_DECIMALS: u32 = 9;

/// Nano-units per display unit.
pub const NANO_PER_UNIT: Amount = 1_000_000_000;

/// Parse an amount given either as a decimal string or as raw nano-units.
pub fn parse_amount(decimal: Option<&str>, nano: Option<i128>) -> Ton20Result<Amount> {
    parse_amount_field("amount", decimal, nano)
}

/// Like [`parse_amount`], naming `field` in error messages.
pub fn parse_amount_field(
    field: &str,
    decimal: Option<&str>,
    nano: Option<i128>,
) -> Ton20Result<Amount> {
    match (decimal, nano) {
        (None, None) => Err(Ton20Error::Config(format!("{} not provided", field))),
        (Some(_), Some(_)) => Err(Ton20Error::Config(format!(
            "{} given both as decimal and nano",
            field
        ))),
        (None, Some(nano)) => Amount::try_from(nano)
            .map_err(|_| Ton20Error::Config(format!("{} must not be negative", field))),
        (Some(decimal), None) => parse_decimal(field, decimal),
    }
}

/// Convert a display-unit decimal string to nano-units, rounding half up at
/// the tenth fractional digit.
///
/// Accepts an optional sign, an optional fractional part and an optional
/// exponent (`1.5`, `.25`, `2e3`). Negative non-zero results are rejected.
fn parse_decimal(field: &str, input: &str) -> Ton20Result<Amount> {
    let invalid = || Ton20Error::Config(format!("invalid {}", field));
    let too_large = || Ton20Error::Config(format!("{} too large", field));

    let s = input.trim();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => {
            let exponent: i32 = s[pos + 1..].parse().map_err(|_| invalid())?;
            (&s[..pos], exponent)
        }
        None => (s, 0),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    // Trailing fractional zeros carry no value; dropping them keeps long
    // inputs like "1.000000000000" inside u128.
    let frac_part = frac_part.trim_end_matches('0');
    let digits = format!("{}{}", int_part, frac_part);
    let digits = digits.trim_start_matches('0');
    let coefficient: Amount = if digits.is_empty() {
        0
    } else {
        digits.parse().map_err(|_| too_large())?
    };

    // value = coefficient * 10^(shift - NANO_DECIMALS), so nano = coefficient * 10^shift
    let shift = i64::from(NANO_DECIMALS) + i64::from(exponent) - frac_part.len() as i64;
    let nano = if coefficient == 0 {
        0
    } else if shift >= 0 {
        let factor = u32::try_from(shift)
            .ok()
            .and_then(|shift| 10u128.checked_pow(shift))
            .ok_or_else(too_large)?;
        coefficient.checked_mul(factor).ok_or_else(too_large)?
    } else {
        divide_half_up(coefficient, shift.unsigned_abs())
    };

    if negative && nano != 0 {
        return Err(Ton20Error::Config(format!("{} must not be negative", field)));
    }
    Ok(nano)
}

/// `value / 10^places`, rounded half up.
fn divide_half_up(value: Amount, places: u64) -> Amount {
    let Some(divisor) = u32::try_from(places).ok().and_then(|p| 10u128.checked_pow(p)) else {
        // 10^places exceeds u128::MAX > 2 * value, so the quotient rounds to 0.
        return 0;
    };
    let quotient = value / divisor;
    let remainder = value % divisor;
    if remainder >= divisor - remainder {
        quotient + 1
    } else {
        quotient
    }
}

/// Render nano-units as an exact display-unit decimal string.
pub fn format_amount(nano: Amount) -> String {
    let whole = nano / NANO_PER_UNIT;
    let frac = nano % NANO_PER_UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:09}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(s: &str) -> Ton20Result<Amount> {
        parse_amount(Some(s), None)
    }

    #[test]
    fn test_whole_units_exact() {
        assert_eq!(decimal("0").unwrap(), 0);
        assert_eq!(decimal("100").unwrap(), 100 * NANO_PER_UNIT);
        assert_eq!(decimal("1000000").unwrap(), 1_000_000_000_000_000);
        assert_eq!(
            decimal("123456789012345678901234").unwrap(),
            123456789012345678901234 * NANO_PER_UNIT
        );
    }

    #[test]
    fn test_fractional() {
        assert_eq!(decimal("1.5").unwrap(), 1_500_000_000);
        assert_eq!(decimal("0.000000001").unwrap(), 1);
        assert_eq!(decimal(".25").unwrap(), 250_000_000);
        assert_eq!(decimal("7.").unwrap(), 7 * NANO_PER_UNIT);
        assert_eq!(decimal("1.000000000000000000000").unwrap(), NANO_PER_UNIT);
        assert_eq!(decimal(" 2.5 ").unwrap(), 2_500_000_000);
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(decimal("0.0000000005").unwrap(), 1);
        assert_eq!(decimal("0.0000000004999").unwrap(), 0);
        assert_eq!(decimal("1.2345678915").unwrap(), 1_234_567_892);
        assert_eq!(decimal("1.2345678914").unwrap(), 1_234_567_891);
        assert_eq!(decimal("1e-40").unwrap(), 0);
    }

    #[test]
    fn test_exponent() {
        assert_eq!(decimal("2e3").unwrap(), 2000 * NANO_PER_UNIT);
        assert_eq!(decimal("1.5E-3").unwrap(), 1_500_000);
    }

    #[test]
    fn test_invalid_decimal() {
        for input in ["", ".", "abc", "1.2.3", "1,5", "--1", "1e", "0x10", "1.5e+x"] {
            let err = decimal(input).unwrap_err();
            assert_eq!(err.to_string(), "invalid amount", "input {:?}", input);
        }
        assert!(matches!(decimal("1e100"), Err(Ton20Error::Config(_))));
    }

    #[test]
    fn test_negative_decimal_rejected() {
        assert_eq!(
            decimal("-1.5").unwrap_err().to_string(),
            "amount must not be negative"
        );
        assert_eq!(decimal("-0").unwrap(), 0);
    }

    #[test]
    fn test_raw_nano() {
        assert_eq!(parse_amount(None, Some(0)).unwrap(), 0);
        assert_eq!(parse_amount(None, Some(500_000_000)).unwrap(), 500_000_000);
        assert!(matches!(
            parse_amount(None, Some(-1)),
            Err(Ton20Error::Config(_))
        ));
    }

    #[test]
    fn test_exactly_one_input() {
        assert_eq!(
            parse_amount(None, None).unwrap_err().to_string(),
            "amount not provided"
        );
        assert_eq!(
            parse_amount_field("supply", None, None)
                .unwrap_err()
                .to_string(),
            "supply not provided"
        );
        assert_eq!(
            parse_amount(Some("1"), Some(1)).unwrap_err().to_string(),
            "amount given both as decimal and nano"
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(600 * NANO_PER_UNIT), "600");
        assert_eq!(format_amount(1_500_000_000), "1.5");
        assert_eq!(format_amount(1), "0.000000001");
    }
}
