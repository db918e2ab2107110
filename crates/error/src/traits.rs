//! # Error Traits
//!
//! Extension methods for results whose error converts into [`AppError`].

use crate::{AppError, Result};

/// Extension methods for Result types.
pub trait ResultExt<T> {
    /// Convert the error and prefix its message with `context`.
    fn context<C: ToString>(self, context: C) -> Result<T>;

    /// Convert the error and log it at error level.
    fn log_error(self) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn context<C: ToString>(self, context: C) -> Result<T> { self.map_err(|e| e.into().context(context)) }

    fn log_error(self) -> Result<T> {
        self.map_err(|e| {
            let err: AppError = e.into();
            tracing::error!(code = err.code(), error = %err, "Operation failed");
            err
        })
    }
}

/// Convert an `Option` into a `NotFound` error.
pub trait OptionExt<T> {
    fn or_not_found(self, what: impl ToString) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, what: impl ToString) -> Result<T> { self.ok_or_else(|| AppError::not_found(what)) }
}
