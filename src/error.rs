use thiserror::Error;

/// Failures talking to a snapshot adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read snapshot {key}: {message}")]
    Read { key: String, message: String },

    #[error("failed to write snapshot {key}: {message}")]
    Write { key: String, message: String },

    #[error("failed to encode snapshot {key}: {message}")]
    Encode { key: String, message: String },
}

impl StorageError {
    pub fn read(key: &str, message: impl ToString) -> Self {
        StorageError::Read {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn write(key: &str, message: impl ToString) -> Self {
        StorageError::Write {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn encode(key: &str, message: impl ToString) -> Self {
        StorageError::Encode {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

/// A user action that was refused before any record changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("payment amount must be greater than zero")]
    NonPositiveAmount,

    #[error("payment amount {amount} exceeds pending amount {pending}")]
    AmountExceedsPending { amount: u64, pending: u64 },

    #[error("fee record {0} is already paid")]
    AlreadyPaid(u64),

    #[error("paid amount {paid} exceeds total amount {total}")]
    PaidExceedsTotal { paid: u64, total: u64 },

    #[error("receipt number {0} is already in use")]
    DuplicateReceipt(String),

    #[error("a role named {0} already exists")]
    DuplicateRoleName(String),

    #[error("email {0} is not a valid address")]
    InvalidEmail(String),

    #[error("student fee record {0} not found")]
    UnknownFeeRecord(u64),
}

impl ValidationError {
    /// IPC error code reported to the UI.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::UnknownFeeRecord(_) => "not_found",
            _ => "validation_failed",
        }
    }
}
