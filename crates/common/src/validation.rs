//! Trade validation rules applied before a trade reaches the queue

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::types::{Side, TradeSubmission};

/// Pattern every accepted symbol must match
pub const SYMBOL_PATTERN: &str = r"^[A-Z]{6}$";

fn symbol_regex() -> &'static Regex {
    static SYMBOL_RE: OnceLock<Regex> = OnceLock::new();
    SYMBOL_RE.get_or_init(|| Regex::new(SYMBOL_PATTERN).expect("symbol pattern is a valid regex"))
}

/// Check that `symbol` is exactly six uppercase ASCII letters
pub fn validate_symbol(symbol: &str) -> Result<()> {
    if !symbol_regex().is_match(symbol) {
        return Err(Error::invalid_input(format!(
            "symbol must match {}",
            SYMBOL_PATTERN
        )));
    }
    Ok(())
}

fn validate_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::invalid_input(format!(
            "{} must be greater than 0",
            field
        )));
    }
    Ok(())
}

/// Validate a submitted trade.
///
/// Rules are checked in field order and the first violation is returned.
pub fn validate_trade(trade: &TradeSubmission) -> Result<()> {
    if trade.account.is_empty() {
        return Err(Error::invalid_input("account must not be empty"));
    }
    validate_symbol(&trade.symbol)?;
    validate_positive("volume", trade.volume)?;
    validate_positive("open", trade.open)?;
    validate_positive("close", trade.close)?;
    trade.side.parse::<Side>().map_err(|_| {
        Error::invalid_input("side must be either 'buy' or 'sell'")
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> TradeSubmission {
        TradeSubmission {
            account: "123".to_string(),
            symbol: "EURUSD".to_string(),
            volume: 1.0,
            open: 1.1,
            close: 1.2,
            side: "buy".to_string(),
        }
    }

    fn message(trade: &TradeSubmission) -> String {
        validate_trade(trade).unwrap_err().to_string()
    }

    #[test]
    fn test_valid_trade() {
        assert!(validate_trade(&valid()).is_ok());

        let mut sell = valid();
        sell.side = "sell".to_string();
        assert!(validate_trade(&sell).is_ok());
    }

    #[test]
    fn test_empty_account() {
        let mut trade = valid();
        trade.account = String::new();
        assert_eq!(message(&trade), "Invalid input: account must not be empty");
    }

    #[test]
    fn test_symbol_rules() {
        for bad in ["EURUS", "EURUSDX", "eurusd", "EUR/US", "EURUS1", ""] {
            let mut trade = valid();
            trade.symbol = bad.to_string();
            assert!(
                message(&trade).contains("symbol must match"),
                "symbol {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_non_positive_numbers() {
        let mut trade = valid();
        trade.volume = 0.0;
        assert!(message(&trade).contains("volume must be greater than 0"));

        let mut trade = valid();
        trade.open = -1.0;
        assert!(message(&trade).contains("open must be greater than 0"));

        let mut trade = valid();
        trade.close = 0.0;
        assert!(message(&trade).contains("close must be greater than 0"));

        let mut trade = valid();
        trade.volume = f64::INFINITY;
        assert!(message(&trade).contains("volume must be greater than 0"));
    }

    #[test]
    fn test_side_rules() {
        let mut trade = valid();
        trade.side = "Buy".to_string();
        assert!(message(&trade).contains("side must be either 'buy' or 'sell'"));
    }
}
