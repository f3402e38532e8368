//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use std::fmt;
use swipe_cache::FeedError;
use swipe_common::AppError;
use swipe_core::DomainError;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or classified store failure
    Domain(DomainError),

    /// Application error (auth, validation, etc.)
    App(AppError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Permission denied
    PermissionDenied { reason: String },

    /// Validation error
    Validation(String),

    /// The change feed could not be reached
    Feed(String),

    /// A live subscription lost its feed; the caller has to subscribe again
    FeedClosed,

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::PermissionDenied { reason } => write!(f, "Permission denied: {reason}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Feed(msg) => write!(f, "Change feed unavailable: {msg}"),
            Self::FeedClosed => write!(f, "Change feed closed"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Worth retrying the whole operation later
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_retryable(),
            Self::Feed(_) | Self::FeedClosed => true,
            _ => false,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => {
                if e.is_not_found() {
                    404
                } else if e.is_authorization() {
                    403
                } else if e.is_validation() {
                    400
                } else if e.is_conflict() {
                    409
                } else if e.is_retryable() {
                    503
                } else {
                    500
                }
            }
            Self::App(e) => e.status_code(),
            Self::NotFound { .. } => 404,
            Self::PermissionDenied { .. } => 403,
            Self::Validation(_) => 400,
            Self::Feed(_) | Self::FeedClosed => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PermissionDenied { .. } => "MISSING_PERMISSIONS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Feed(_) => "SERVICE_UNAVAILABLE",
            Self::FeedClosed => "FEED_CLOSED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<FeedError> for ServiceError {
    fn from(err: FeedError) -> Self {
        Self::Feed(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::PermissionDenied { reason } => AppError::InsufficientPermissions(reason),
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Feed(_) | ServiceError::FeedClosed => AppError::Unavailable,
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use swipe_core::Snowflake;

    #[test]
    fn test_not_found_error() {
        let err = ServiceError::not_found("Room", "123");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("Room not found: 123"));
    }

    #[test]
    fn test_domain_error_mapping() {
        let err = ServiceError::from(DomainError::RoomNotFound(Snowflake::new(7)));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "UNKNOWN_ROOM");

        let err = ServiceError::from(DomainError::NotRoomMember);
        assert_eq!(err.status_code(), 403);

        let err = ServiceError::from(DomainError::PinSpaceExhausted { attempts: 5 });
        assert_eq!(err.status_code(), 503);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_validation_error() {
        let err = ServiceError::validation("Room name must be 1-50 characters");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_feed_error_is_unavailable() {
        let err = ServiceError::from(FeedError::SubscribeTimeout);
        assert_eq!(err.status_code(), 503);
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Unavailable));
    }

    #[test]
    fn test_convert_to_app_error() {
        let app_err: AppError = ServiceError::permission_denied("not in this match").into();
        assert_eq!(app_err.status_code(), 403);

        let app_err: AppError = ServiceError::not_found("Match", "456").into();
        assert_eq!(app_err.status_code(), 404);
    }
}
