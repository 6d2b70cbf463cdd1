//! Price formatting
//!
//! Prices are shown with exactly two decimals, rounded half away from zero,
//! followed by the currency suffix: `2.5` becomes `2.50 AZN`.

use pricemonitor_api_client::endpoints::price::parse_amount;
use pricemonitor_api_client::ApiResult;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places shown on screen
pub const PRICE_DECIMALS: u32 = 2;

/// Format an amount for display
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    let mut rounded =
        amount.round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(PRICE_DECIMALS);

    if currency.is_empty() {
        rounded.to_string()
    } else {
        format!("{rounded} {currency}")
    }
}

/// Parse and format a price string as sent by the server
pub fn format_price(price: &str, currency: &str) -> ApiResult<String> {
    parse_amount(price).map(|amount| format_amount(amount, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_to_two_decimals() {
        assert_eq!(format_price("2.5", "AZN").unwrap(), "2.50 AZN");
        assert_eq!(format_price("19", "AZN").unwrap(), "19.00 AZN");
        assert_eq!(format_price("0", "AZN").unwrap(), "0.00 AZN");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(format_price("19.995", "AZN").unwrap(), "20.00 AZN");
        assert_eq!(format_price("19.994", "AZN").unwrap(), "19.99 AZN");
        assert_eq!(format_price("0.125", "AZN").unwrap(), "0.13 AZN");
        assert_eq!(format_price("-1.005", "AZN").unwrap(), "-1.01 AZN");
    }

    #[test]
    fn test_custom_and_empty_currency() {
        assert_eq!(format_price("3.1", "USD").unwrap(), "3.10 USD");
        assert_eq!(format_price("3.1", "").unwrap(), "3.10");
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(format_price("free", "AZN").is_err());
    }
}
