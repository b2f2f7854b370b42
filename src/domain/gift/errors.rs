//! Gift processing errors.

use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors raised while processing a parsed gift zap.
#[derive(Debug, Clone, Error)]
pub enum GiftError {
    /// The processed-zap store could not be read or written.
    #[error("Processed zap store error: {0}")]
    Ledger(DomainError),

    /// The account store failed, or the gift could not be applied.
    #[error("Activation failed: {0}")]
    Activation(DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_message_includes_cause() {
        let err = GiftError::Activation(DomainError::database("connection reset"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn ledger_message_includes_cause() {
        let err = GiftError::Ledger(DomainError::database("pool timed out"));
        assert!(err.to_string().starts_with("Processed zap store error"));
        assert!(err.to_string().contains("pool timed out"));
    }
}
