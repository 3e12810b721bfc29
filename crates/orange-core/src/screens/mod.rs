//! Screen controllers.
//!
//! A screen owns the state one view shows (a record list, a login form) and
//! is the boundary where API errors become user-facing notices. Requests run
//! in background tasks; their results come back over a channel and are only
//! applied while the screen is still mounted.

pub mod login;
pub mod resource;
pub mod students;

pub use login::LoginScreen;
pub use resource::ResourceScreen;
pub use students::StudentRecordScreen;

use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message for the user, shown as an alert or status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Technical detail for logs or an expanded view
    pub detail: Option<String>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            detail: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            detail: None,
        }
    }

    /// Error notice for a failed action, with the cause as detail
    pub fn failure(message: impl Into<String>, error: &ApiError) -> Self {
        let detail = match error {
            ApiError::Unauthenticated => "Not logged in".to_string(),
            ApiError::AuthRejected { .. } => "Session expired or access denied".to_string(),
            other => other.to_string(),
        };
        Self {
            detail: Some(detail),
            ..Self::error(message)
        }
    }

    pub fn title(&self) -> &'static str {
        match self.level {
            NoticeLevel::Success => "Success",
            NoticeLevel::Error => "Error",
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
