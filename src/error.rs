//! Error taxonomy for the bot.
//!
//! Every failure is classified as either retryable (transient exchange or
//! network state), fatal (bad credentials or bad configuration), or a plain
//! invalid-input error from the pricing functions. The REST client uses
//! `is_retryable` to decide whether a request goes through another backoff
//! round; `main` uses `is_fatal` to decide whether to alert and exit.

use thiserror::Error;

/// Errors produced by the pricing engine, the REST client, and config loading.
#[derive(Debug, Error)]
pub enum BotError {
    /// Bad arguments to a pricing function (non-positive price, unknown side, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Rejected credentials or signature
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Exchange rate limit hit
    #[error("rate limited by exchange")]
    RateLimited,

    /// Request exceeded the per-call timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Error response from the exchange API
    #[error("exchange API error {code}: {message}")]
    Api { code: i32, message: String },

    /// Response body did not match the expected shape
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Expected data missing from a response (e.g. asset not in balance list)
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type for bot operations.
pub type BotResult<T> = Result<T, BotError>;

impl BotError {
    /// Whether the operation may succeed if simply tried again.
    pub fn is_retryable(&self) -> bool {
        match self {
            BotError::RateLimited | BotError::Timeout(_) | BotError::Network(_) => true,
            // -1001: internal error / disconnected, -1021: timestamp outside recvWindow
            BotError::Api { code, .. } => matches!(*code, -1001 | -1021),
            _ => false,
        }
    }

    /// Whether the process should stop rather than retry or continue.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BotError::Auth(_) | BotError::Config(_) | BotError::InvalidInput(_)
        )
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BotError::Timeout(err.to_string())
        } else {
            BotError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(BotError::RateLimited.is_retryable());
        assert!(BotError::Timeout("10s elapsed".to_string()).is_retryable());
        assert!(BotError::Network("connection reset".to_string()).is_retryable());
        assert!(BotError::Api {
            code: -1021,
            message: "Timestamp outside recvWindow".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_fatal_errors_are_not_retryable() {
        let auth = BotError::Auth("invalid API key".to_string());
        assert!(auth.is_fatal());
        assert!(!auth.is_retryable());

        let input = BotError::InvalidInput("mark price must be positive".to_string());
        assert!(input.is_fatal());
        assert!(!input.is_retryable());
    }

    #[test]
    fn test_api_errors_are_neither_by_default() {
        let err = BotError::Api {
            code: -2019,
            message: "Margin is insufficient".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(!err.is_fatal());
    }
}
