//! Errors the engine can return.
//!
//! The variants mirror the failure classes callers need to tell apart:
//! invalid input, missing/foreign-owned rows, duplicates, transient
//! storage conflicts, and internal consistency breaks that abort the
//! whole atomic unit.

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Input rejected before or during validation: non-positive amount,
    /// same-wallet transfer, reserved category used directly, and so on.
    /// Nothing was written.
    #[error("Invalid request: {0}")]
    Validation(String),
    /// The referenced row does not exist or belongs to another user.
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    /// A row with the same unique key already exists.
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    /// A row referenced by a transaction vanished between steps of an
    /// atomic unit. The unit is rolled back.
    #[error("Consistency violation: {0}")]
    Consistency(String),
    /// Storage stayed busy after one retry; the caller may retry the
    /// whole operation.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Whether a database error is sqlite reporting a locked/busy handle.
pub(crate) fn is_busy(err: &DbErr) -> bool {
    let text = err.to_string();
    text.contains("database is locked") || text.contains("database table is locked")
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Consistency(a), Self::Consistency(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
