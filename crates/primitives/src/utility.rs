use crate::error::ApiError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Money is stored with two decimal places.
pub const MONEY_SCALE: u32 = 2;

const MAX_MESSAGE_LEN: usize = 1000;

/// Largest value a `NUMERIC(12,2)` column holds.
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Parses user-supplied money text, rejecting anything that is not a positive amount.
pub fn parse_amount(input: &str) -> Result<Decimal, ApiError> {
    let trimmed = input.trim();

    let amount = Decimal::from_str(trimmed)
        .map_err(|_| ApiError::InvalidAmount(format!("'{}' is not a number", trimmed)))?;

    validate_amount(amount)
}

/// Checks an amount is strictly positive and representable at money scale.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, ApiError> {
    if amount <= Decimal::ZERO {
        return Err(ApiError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }

    if amount > max_amount() {
        return Err(ApiError::InvalidAmount(format!(
            "amount {} exceeds the maximum of {}",
            amount,
            max_amount()
        )));
    }

    let normalized = amount.normalize();
    if normalized.scale() > MONEY_SCALE {
        return Err(ApiError::InvalidAmount(format!(
            "amount {} has more than {} decimal places",
            amount, MONEY_SCALE
        )));
    }

    Ok(normalized)
}

/// Collapses control whitespace so messages render on one line in SMS and logs.
pub fn sanitize_message(input: &str) -> String {
    let collapsed: String = input
        .chars()
        .map(|c| if matches!(c, '\r' | '\n' | '\t') { ' ' } else { c })
        .collect();

    collapsed.trim().chars().take(MAX_MESSAGE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_positive_amounts() {
        assert_eq!(parse_amount(" 100 ").unwrap(), dec!(100));
        assert_eq!(parse_amount("0.50").unwrap(), dec!(0.5));
    }

    #[test]
    fn rejects_non_numeric_and_non_positive() {
        assert!(matches!(parse_amount("ten"), Err(ApiError::InvalidAmount(_))));
        assert!(matches!(parse_amount("0"), Err(ApiError::InvalidAmount(_))));
        assert!(matches!(parse_amount("-5"), Err(ApiError::InvalidAmount(_))));
    }

    #[test]
    fn rejects_sub_cent_precision() {
        assert!(validate_amount(dec!(1.005)).is_err());
        assert!(validate_amount(dec!(1.500)).is_ok());
    }

    #[test]
    fn rejects_amounts_above_storage_limit() {
        assert_eq!(validate_amount(dec!(9999999999.99)).unwrap(), dec!(9999999999.99));
        assert!(matches!(
            validate_amount(dec!(10000000000)),
            Err(ApiError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount(Decimal::MAX),
            Err(ApiError::InvalidAmount(_))
        ));
    }

    #[test]
    fn sanitizes_control_whitespace() {
        assert_eq!(sanitize_message("  hello\r\nworld\t "), "hello  world");
    }
}
