use thiserror::Error;

/// Core error type for pulse operations.
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("URL parse error: {0}")]
    UrlParse(String),

    #[error("Payload decode error: {0}")]
    PayloadDecode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PulseError {
    /// Whether this is the expected "key absent" outcome of a store lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<url::ParseError> for PulseError {
    fn from(e: url::ParseError) -> Self {
        PulseError::UrlParse(e.to_string())
    }
}

impl From<base64::DecodeError> for PulseError {
    fn from(e: base64::DecodeError) -> Self {
        PulseError::PayloadDecode(e.to_string())
    }
}

impl From<serde_json::Error> for PulseError {
    fn from(e: serde_json::Error) -> Self {
        PulseError::Serialization(e.to_string())
    }
}

/// Result type alias using PulseError.
pub type Result<T> = std::result::Result<T, PulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(PulseError::NotFound("k".into()).is_not_found());
        assert!(!PulseError::Store("down".into()).is_not_found());
    }

    #[test]
    fn test_url_error_conversion() {
        let err: PulseError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, PulseError::UrlParse(_)));
    }
}
