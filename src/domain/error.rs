//! Domain error types.

/// Top-level error type for rotator.
#[derive(Debug, thiserror::Error)]
pub enum RotatorError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&RotatorError> for std::process::ExitCode {
    fn from(err: &RotatorError) -> Self {
        let code: u8 = match err {
            RotatorError::Io(_) => 1,
            RotatorError::ConfigParse { .. }
            | RotatorError::ConfigMissing { .. }
            | RotatorError::ConfigInvalid { .. } => 2,
            RotatorError::Data { .. } => 3,
            RotatorError::NoData { .. } | RotatorError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = RotatorError::NoData {
            symbol: "SPY".into(),
        };
        assert_eq!(err.to_string(), "no data for SPY");

        let err = RotatorError::InsufficientData {
            symbol: "XLK".into(),
            bars: 12,
            minimum: 30,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for XLK: have 12 bars, need 30"
        );
    }

    #[test]
    fn config_error_messages() {
        let err = RotatorError::ConfigMissing {
            section: "backtest".into(),
            key: "start_date".into(),
        };
        assert_eq!(err.to_string(), "missing config key [backtest] start_date");
    }

    #[test]
    fn exit_code_mapping() {
        use std::process::ExitCode;

        let io_err = RotatorError::Io(std::io::Error::other("boom"));
        let _code: ExitCode = (&io_err).into();

        let config_err = RotatorError::ConfigMissing {
            section: "s".into(),
            key: "k".into(),
        };
        let _code: ExitCode = (&config_err).into();

        let data_err = RotatorError::NoData {
            symbol: "SPY".into(),
        };
        let _code: ExitCode = (&data_err).into();
    }
}
