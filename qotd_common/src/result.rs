//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `QotdError`, so functions can simply return `Result<T>`.
use crate::error::QotdError;

/// Workspace-wide `Result` alias with `QotdError` as the default error.
pub type Result<T, E = QotdError> = std::result::Result<T, E>;
