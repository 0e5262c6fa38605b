//! Domain error types.
//!
//! There is no insufficient-history variant: strategies recover from it by
//! reporting a neutral signal.

/// Top-level error type for confluence.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
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

    #[error("invalid price data for {symbol} at bar {index}: {reason}")]
    InvalidPriceData {
        symbol: String,
        index: usize,
        reason: String,
    },

    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("snapshot error: {reason}")]
    Snapshot { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfluenceError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ConfluenceError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ConfluenceError::ConfigParse { .. }
                | ConfluenceError::ConfigMissing { .. }
                | ConfluenceError::ConfigInvalid { .. }
        )
    }
}

impl From<&ConfluenceError> for std::process::ExitCode {
    fn from(err: &ConfluenceError) -> Self {
        let code: u8 = match err {
            ConfluenceError::Io(_) => 1,
            ConfluenceError::ConfigParse { .. }
            | ConfluenceError::ConfigMissing { .. }
            | ConfluenceError::ConfigInvalid { .. } => 2,
            ConfluenceError::Data { .. } => 3,
            ConfluenceError::Snapshot { .. } => 4,
            ConfluenceError::InvalidPriceData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_price_data_message() {
        let err = ConfluenceError::InvalidPriceData {
            symbol: "BTC-USDT".into(),
            index: 7,
            reason: "timestamp not increasing".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid price data for BTC-USDT at bar 7: timestamp not increasing"
        );
    }

    #[test]
    fn config_errors_are_classified() {
        assert!(ConfluenceError::invalid("weights", "macd_momentum", "negative").is_config_error());
        assert!(!ConfluenceError::Data { reason: "x".into() }.is_config_error());
    }

    #[test]
    fn exit_codes_differ_by_kind() {
        let config = ConfluenceError::ConfigMissing {
            section: "engine".into(),
            key: "min_confidence".into(),
        };
        let data = ConfluenceError::Data { reason: "gone".into() };
        assert_ne!(
            format!("{:?}", std::process::ExitCode::from(&config)),
            format!("{:?}", std::process::ExitCode::from(&data))
        );
    }
}
