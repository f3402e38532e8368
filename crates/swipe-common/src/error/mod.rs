//! Error types

mod app_error;

pub use app_error::{AppError, AppResult, ErrorResponse, TRY_AGAIN_MESSAGE};
