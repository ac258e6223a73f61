use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Protocol("missing navigation".to_string());
        assert_eq!(err.to_string(), "Protocol error: missing navigation");
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::ValidationError("bad".to_string()).into();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("Validation error: bad"));
    }
}
