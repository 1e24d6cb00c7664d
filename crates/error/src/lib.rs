//! # Rally Error Infrastructure
//!
//! Error types and API response handling for the rally application.
//!
//! The taxonomy separates authorization failures (`Unauthorized`) from
//! business-rule rejections (`NotAllowed`, `CapacityExceeded`,
//! `DuplicateEvaluation`, `NotEligible`, `EventFinalized`) so callers can
//! tell "you may not see or touch this row" apart from "the rules said no".

pub mod response;
pub mod traits;

pub use response::{ApiResponse, PaginationMeta};
pub use traits::ResultExt;

/// Convenience type alias for Result with AppError.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Main application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("NotFound: {message}")]
    NotFound { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Validation: {message}")]
    Validation { message: String },

    #[error("NotAllowed: {message}")]
    NotAllowed { message: String },

    #[error("CapacityExceeded: {message}")]
    CapacityExceeded { message: String },

    #[error("DuplicateEvaluation: {message}")]
    DuplicateEvaluation { message: String },

    #[error("NotEligible: {message}")]
    NotEligible { message: String },

    #[error("EventFinalized: {message}")]
    EventFinalized { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal: {message}")]
    Internal { message: String },

    #[error("Database: {message}")]
    Database { message: String },

    #[error("IO: {message}")]
    Io { message: String },

    #[error("Config: {message}")]
    Config { message: String },

    #[error("Migration: {message}")]
    Migration { message: String },
}

impl AppError {
    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl ToString) -> Self {
        Self::NotFound {
            message: resource.to_string(),
        }
    }

    /// Create an unauthorized error.
    #[inline]
    pub fn unauthorized(message: impl ToString) -> Self {
        Self::Unauthorized {
            message: message.to_string(),
        }
    }

    /// Create a validation error.
    #[inline]
    pub fn validation(message: impl ToString) -> Self {
        Self::Validation {
            message: message.to_string(),
        }
    }

    /// Create a not-allowed error (role or state precondition failed).
    #[inline]
    pub fn not_allowed(message: impl ToString) -> Self {
        Self::NotAllowed {
            message: message.to_string(),
        }
    }

    /// Create a capacity-exceeded error.
    #[inline]
    pub fn capacity_exceeded(message: impl ToString) -> Self {
        Self::CapacityExceeded {
            message: message.to_string(),
        }
    }

    /// Create a duplicate-evaluation error.
    #[inline]
    pub fn duplicate_evaluation(message: impl ToString) -> Self {
        Self::DuplicateEvaluation {
            message: message.to_string(),
        }
    }

    /// Create a not-eligible error.
    #[inline]
    pub fn not_eligible(message: impl ToString) -> Self {
        Self::NotEligible {
            message: message.to_string(),
        }
    }

    /// Create an event-finalized error.
    #[inline]
    pub fn event_finalized(message: impl ToString) -> Self {
        Self::EventFinalized {
            message: message.to_string(),
        }
    }

    /// Create a conflict error.
    #[inline]
    pub fn conflict(message: impl ToString) -> Self {
        Self::Conflict {
            message: message.to_string(),
        }
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(message: impl ToString) -> Self {
        Self::Internal {
            message: message.to_string(),
        }
    }

    /// Create a database error.
    #[inline]
    pub fn database(message: impl ToString) -> Self {
        Self::Database {
            message: message.to_string(),
        }
    }

    /// Create a config error.
    #[inline]
    pub fn config(message: impl ToString) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }

    /// Create a migration error.
    #[inline]
    pub fn migration(message: impl ToString) -> Self {
        Self::Migration {
            message: message.to_string(),
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> http::StatusCode {
        match self {
            AppError::NotFound { .. } => http::StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => http::StatusCode::UNAUTHORIZED,
            AppError::Validation { .. } => http::StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotAllowed { .. } => http::StatusCode::FORBIDDEN,
            AppError::NotEligible { .. } => http::StatusCode::FORBIDDEN,
            AppError::CapacityExceeded { .. } => http::StatusCode::CONFLICT,
            AppError::DuplicateEvaluation { .. } => http::StatusCode::CONFLICT,
            AppError::EventFinalized { .. } => http::StatusCode::CONFLICT,
            AppError::Conflict { .. } => http::StatusCode::CONFLICT,
            AppError::Internal { .. }
            | AppError::Database { .. }
            | AppError::Io { .. }
            | AppError::Config { .. }
            | AppError::Migration { .. } => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Unauthorized { .. } => "UNAUTHORIZED",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotAllowed { .. } => "NOT_ALLOWED",
            AppError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            AppError::DuplicateEvaluation { .. } => "DUPLICATE_EVALUATION",
            AppError::NotEligible { .. } => "NOT_ELIGIBLE",
            AppError::EventFinalized { .. } => "EVENT_FINALIZED",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::Internal { .. } => "INTERNAL_ERROR",
            AppError::Database { .. } => "DATABASE_ERROR",
            AppError::Io { .. } => "IO_ERROR",
            AppError::Config { .. } => "CONFIG_ERROR",
            AppError::Migration { .. } => "MIGRATION_ERROR",
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound { message }
            | AppError::Unauthorized { message }
            | AppError::Validation { message }
            | AppError::NotAllowed { message }
            | AppError::CapacityExceeded { message }
            | AppError::DuplicateEvaluation { message }
            | AppError::NotEligible { message }
            | AppError::EventFinalized { message }
            | AppError::Conflict { message }
            | AppError::Internal { message }
            | AppError::Database { message }
            | AppError::Io { message }
            | AppError::Config { message }
            | AppError::Migration { message } => message.clone(),
        }
    }

    /// True for failures the caller may retry safely; every mutating
    /// operation is transactional or idempotent, so store-connectivity
    /// errors never leave partial state behind.
    pub fn is_retriable(&self) -> bool { matches!(self, AppError::Database { .. } | AppError::Io { .. }) }

    fn message_mut(&mut self) -> &mut String {
        match self {
            AppError::NotFound { message }
            | AppError::Unauthorized { message }
            | AppError::Validation { message }
            | AppError::NotAllowed { message }
            | AppError::CapacityExceeded { message }
            | AppError::DuplicateEvaluation { message }
            | AppError::NotEligible { message }
            | AppError::EventFinalized { message }
            | AppError::Conflict { message }
            | AppError::Internal { message }
            | AppError::Database { message }
            | AppError::Io { message }
            | AppError::Config { message }
            | AppError::Migration { message } => message,
        }
    }

    /// Add context to the error.
    #[inline]
    pub fn context(mut self, context: impl ToString) -> Self {
        let message = self.message_mut();
        *message = format!("{}: {}", context.to_string(), message);
        self
    }
}

/// Convert anyhow errors to AppError.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

/// Convert std::io errors to AppError.
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

/// Convert Sea-ORM database errors to AppError.
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database {
            message: err.to_string(),
        }
    }
}

/// Convert Sea-ORM transaction errors to AppError, unwrapping business
/// errors raised inside the closure.
impl From<sea_orm::TransactionError<AppError>> for AppError {
    fn from(err: sea_orm::TransactionError<AppError>) -> Self {
        match err {
            sea_orm::TransactionError::Connection(db) => db.into(),
            sea_orm::TransactionError::Transaction(app) => app,
        }
    }
}

/// Convert validator validation errors to AppError.
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(_, errors)| {
                errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|s| s.to_string())
                            .unwrap_or_else(|| "Invalid value".to_string())
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        let message = if messages.is_empty() {
            "Validation failed".to_string()
        }
        else {
            messages.join(", ")
        };

        Self::Validation {
            message,
        }
    }
}
