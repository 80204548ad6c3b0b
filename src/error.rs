use thiserror::Error;

/// XP gain attempted while penalties are outstanding.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("active debt: clear outstanding penalties before gaining XP")]
pub struct Blocked;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle offline: no language-model credential configured")]
    NoServiceConfigured,

    #[error("oracle needs a report to analyse")]
    EmptyNarrative,

    #[error("malformed oracle response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    #[error("oracle transport failure: {0}")]
    TransportFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl OracleError {
    pub fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        OracleError::MalformedResponse {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    pub fn transport(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        OracleError::TransportFailure(cause.into())
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::TransportFailure(Box::new(err))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid secrets toml: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum SystemError {
    #[error(transparent)]
    Blocked(#[from] Blocked),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("penalty description must not be empty")]
    InvalidPenalty,

    #[error("weekly rest already used this week")]
    RestAlreadyUsed,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("progress json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SystemError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_transport_failure_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused by host");
        let err = OracleError::transport(io);

        assert_eq!(err.to_string(), "oracle transport failure: refused by host");
        let source = err.source().expect("cause is chained");
        let io = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn test_oracle_error_chains_through_system_error() {
        let err = SystemError::from(OracleError::transport("dns lookup failed"));
        // transparent: the oracle error's own source is exposed
        assert_eq!(err.source().unwrap().to_string(), "dns lookup failed");
    }
}
