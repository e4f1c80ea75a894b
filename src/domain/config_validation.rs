//! Configuration validation.
//!
//! Validates `[backtest]` values before a run. Missing keys fall back to the
//! engine defaults, so an empty config is valid. A key that is present but
//! not a number is an error, never a default.

use crate::domain::backtest::{BacktestConfig, DEFAULT_RISK_FREE_RATE};
use crate::domain::error::SigtraderError;
use crate::domain::pairing::{DEFAULT_INITIAL_BALANCE, DEFAULT_TRADE_SIZE_FRACTION};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_values(&read_backtest_values(config)?)?;
    validate_dates(config)?;
    Ok(())
}

/// `[backtest]` numeric values with engine defaults for missing keys.
pub fn read_backtest_values(config: &dyn ConfigPort) -> Result<BacktestConfig, SigtraderError> {
    Ok(BacktestConfig {
        initial_balance: config.get_double("backtest", "initial_balance", DEFAULT_INITIAL_BALANCE)?,
        trade_size_fraction: config.get_double(
            "backtest",
            "trade_size_fraction",
            DEFAULT_TRADE_SIZE_FRACTION,
        )?,
        risk_free_rate: config.get_double("backtest", "risk_free_rate", DEFAULT_RISK_FREE_RATE)?,
    })
}

/// Range checks shared by file values and command-line overrides.
pub fn validate_values(values: &BacktestConfig) -> Result<(), SigtraderError> {
    if !values.initial_balance.is_finite() || values.initial_balance <= 0.0 {
        return Err(invalid("initial_balance", "initial_balance must be positive"));
    }
    if !(values.trade_size_fraction > 0.0 && values.trade_size_fraction <= 1.0) {
        return Err(invalid(
            "trade_size_fraction",
            "trade_size_fraction must be greater than 0 and at most 1",
        ));
    }
    if !(0.0..1.0).contains(&values.risk_free_rate) {
        return Err(invalid(
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn invalid(key: &str, reason: &str) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid("start_date", "start_date must be before end_date"));
        }
    }
    Ok(())
}

/// Parse an optional `YYYY-MM-DD` key from `[backtest]`.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, SigtraderError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| invalid(key, &format!("invalid {} format, expected YYYY-MM-DD", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_backtest_config_passes() {
        let config = make_config(
            r#"
[backtest]
initial_balance = 25000
trade_size_fraction = 0.25
risk_free_rate = 0.03
start_date = 2022-01-01
end_date = 2023-12-31
strategy = EMA + RSI
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = make_config("[backtest]\n");
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn initial_balance_must_be_positive() {
        let config = make_config("[backtest]\ninitial_balance = -100\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "initial_balance")
        );
    }

    #[test]
    fn initial_balance_zero_fails() {
        let config = make_config("[backtest]\ninitial_balance = 0\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "initial_balance")
        );
    }

    #[test]
    fn trade_size_zero_fails() {
        let config = make_config("[backtest]\ntrade_size_fraction = 0\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "trade_size_fraction")
        );
    }

    #[test]
    fn trade_size_above_one_fails() {
        let config = make_config("[backtest]\ntrade_size_fraction = 1.5\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "trade_size_fraction")
        );
    }

    #[test]
    fn trade_size_of_one_passes() {
        let config = make_config("[backtest]\ntrade_size_fraction = 1.0\n");
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn risk_free_rate_out_of_range_fails() {
        let config = make_config("[backtest]\nrisk_free_rate = 1.5\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "risk_free_rate")
        );
    }

    #[test]
    fn risk_free_rate_negative_fails() {
        let config = make_config("[backtest]\nrisk_free_rate = -0.05\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "risk_free_rate")
        );
    }

    #[test]
    fn invalid_start_date_format_fails() {
        let config = make_config("[backtest]\nstart_date = 2020/01/01\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn start_date_after_end_date_fails() {
        let config = make_config("[backtest]\nstart_date = 2024-12-31\nend_date = 2020-01-01\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn read_values_applies_defaults() {
        let config = make_config("[backtest]\ninitial_balance = 500\n");
        let values = read_backtest_values(&config).unwrap();
        assert_eq!(
            values,
            BacktestConfig {
                initial_balance: 500.0,
                ..BacktestConfig::default()
            }
        );
    }

    #[test]
    fn non_numeric_values_are_rejected_not_defaulted() {
        let config = make_config("[backtest]\ninitial_balance = 25k\n");
        let err = read_backtest_values(&config).unwrap_err();
        assert!(
            matches!(&err, SigtraderError::ConfigInvalid { key, reason, .. }
                if key == "initial_balance" && reason.contains("25k"))
        );

        let config = make_config("[backtest]\nrisk_free_rate = 2%\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "risk_free_rate")
        );

        let config = make_config("[backtest]\ntrade_size_fraction = ten percent\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "trade_size_fraction")
        );
    }

    #[test]
    fn validate_values_rejects_nan_fraction() {
        let values = BacktestConfig {
            trade_size_fraction: f64::NAN,
            ..BacktestConfig::default()
        };
        let err = validate_values(&values).unwrap_err();
        assert!(
            matches!(err, SigtraderError::ConfigInvalid { key, .. } if key == "trade_size_fraction")
        );
    }

    #[test]
    fn single_date_bound_is_allowed() {
        let config = make_config("[backtest]\nstart_date = 2024-01-01\n");
        assert!(validate_backtest_config(&config).is_ok());
        assert_eq!(
            parse_optional_date(&config, "start_date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(parse_optional_date(&config, "end_date").unwrap(), None);
    }
}
