use std::fmt;

/// Reasons an insert is rejected by validation.
///
/// Rejection is reporting-only: the ledger logs the reason and drops the
/// insert, nothing propagates to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// Price was zero or negative
    InvalidPrice,

    /// Quantity was zero or negative
    InvalidQuantity,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::InvalidPrice => write!(f, "price must be positive"),
            InsertError::InvalidQuantity => write!(f, "quantity must be positive"),
        }
    }
}

impl std::error::Error for InsertError {}
