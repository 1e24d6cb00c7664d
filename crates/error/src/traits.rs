//! # Error Traits
//!
//! Extension methods for Result types.

use crate::{AppError, Result};

/// Extension methods for Result types.
pub trait ResultExt<T> {
    /// Convert the error and prefix it with context.
    fn context<C: ToString>(self, context: C) -> Result<T>;
    /// Convert the error, logging it at error level.
    fn log_error(self) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn context<C: ToString>(self, context: C) -> Result<T> {
        self.map_err(|e| {
            let err: AppError = e.into();
            err.context(context)
        })
    }

    fn log_error(self) -> Result<T> {
        self.map_err(|e| {
            let err: AppError = e.into();
            tracing::error!(error = %err, "Error occurred");
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context() {
        let result: Result<i32> = Err(AppError::not_found("Team"));
        let result = result.context("Looking up captain");

        assert_eq!(result.unwrap_err().message(), "Looking up captain: Team");
    }

    #[test]
    fn test_log_error() {
        let result: Result<i32> = Err(AppError::not_found("User"));
        assert!(result.log_error().is_err());
    }
}
