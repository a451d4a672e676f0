//! Error categories and user-facing alerts.
//!
//! Every failure a command can hit converts into [`AppError`]. What the user
//! sees is decided only by the HTTP status: 401 asks for a new login,
//! 400/404/409 get a dialog with the backend's message, 5xx and transport
//! failures get a generic "try again". Nothing is retried.

use std::fmt;

use serde::Serialize;

use crate::client::ApiError;
use crate::config::ConfigError;
use crate::i18n::Locale;
use crate::session::SessionError;
use crate::storage::StorageError;
use crate::validation::ValidationError;

/// The unified error type for companion operations
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 401: credentials were cleared, log in again
    Unauthorized,
    BadRequest,
    NotFound,
    Conflict,
    /// 5xx
    Server,
    /// Timeout, refused connection, broken body
    Network,
    /// Rejected before any request was made
    Validation,
    Other,
}

impl ErrorCategory {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorCategory::Unauthorized,
            400 => ErrorCategory::BadRequest,
            404 => ErrorCategory::NotFound,
            409 => ErrorCategory::Conflict,
            500..=599 => ErrorCategory::Server,
            _ => ErrorCategory::Other,
        }
    }

    pub fn of_api(err: &ApiError) -> Self {
        match err {
            ApiError::Http { status, .. } => Self::from_status(*status),
            ApiError::Network(_) => ErrorCategory::Network,
            ApiError::Parse(_) | ApiError::Storage(_) | ApiError::Setup(_) => ErrorCategory::Other,
        }
    }

    /// Whether a "try again" prompt makes sense
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorCategory::Server | ErrorCategory::Network)
    }
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Api(e) => ErrorCategory::of_api(e),
            AppError::Session(SessionError::Api(e)) => ErrorCategory::of_api(e),
            AppError::Session(SessionError::InvalidCredentials) => ErrorCategory::Unauthorized,
            AppError::Session(SessionError::ServerUnavailable) => ErrorCategory::Server,
            AppError::Validation(_) | AppError::Session(SessionError::Validation(_)) => {
                ErrorCategory::Validation
            }
            AppError::Session(SessionError::Storage(_))
            | AppError::Storage(_)
            | AppError::Config(_)
            | AppError::Output(_) => ErrorCategory::Other,
        }
    }
}

/// Blocking dialog content: a title and a message in the user's language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(locale: Locale, message_key: &str) -> Self {
        Self::new(locale.t("common.success"), locale.t(message_key))
    }

    /// Alert for a failed backend call
    pub fn for_api(err: &ApiError, locale: Locale) -> Self {
        let backend = err.backend_message();
        let pick = |default_key: &str| backend.map(str::to_string).unwrap_or_else(|| locale.t(default_key));

        let category = ErrorCategory::of_api(err);
        if category.is_transient() {
            // Backend details are never shown for these
            let key = match category {
                ErrorCategory::Network => "errors.network",
                _ => "errors.server",
            };
            return Self::new(locale.t("common.error"), locale.t(key));
        }

        match category {
            ErrorCategory::Unauthorized => Self::new(
                locale.t("errors.sessionExpiredTitle"),
                locale.t("errors.sessionExpired"),
            ),
            ErrorCategory::BadRequest => {
                Self::new(locale.t("errors.badRequestTitle"), pick("errors.badRequest"))
            }
            ErrorCategory::NotFound => {
                Self::new(locale.t("errors.notFoundTitle"), pick("errors.notFound"))
            }
            ErrorCategory::Conflict => {
                Self::new(locale.t("errors.conflictTitle"), pick("errors.conflict"))
            }
            _ => Self::new(locale.t("common.error"), pick("errors.generic")),
        }
    }

    pub fn for_error(err: &AppError, locale: Locale) -> Self {
        match err {
            AppError::Api(e) => Self::for_api(e, locale),
            AppError::Validation(e) => Self::new(locale.t("validation.title"), e.localized(locale)),
            AppError::Session(SessionError::Validation(e)) => {
                Self::new(locale.t("validation.title"), e.localized(locale))
            }
            AppError::Session(e) => Self::new(locale.t("common.error"), e.localized(locale)),
            AppError::Storage(_) | AppError::Config(_) | AppError::Output(_) => {
                Self::new(locale.t("common.error"), err.to_string())
            }
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
