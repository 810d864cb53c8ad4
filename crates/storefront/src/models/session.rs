//! Session-related types.
//!
//! The session carries two records: the cart (see [`crate::cart`]) and a
//! one-shot notice shown on the next page render.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session keys.
pub mod keys {
    /// The persisted cart: a JSON array of line items.
    pub const CART: &str = "cart";

    /// One-shot notice shown after a redirect.
    pub const NOTICE: &str = "notice";
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Whether this notice should be styled as an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }

    /// Store this notice for the next page render.
    ///
    /// Failures are logged; a lost notice never fails the request.
    pub async fn flash(self, session: &Session) {
        if let Err(e) = session.insert(keys::NOTICE, self).await {
            tracing::warn!(error = %e, "Failed to store notice in session");
        }
    }

    /// Take the pending notice, if any, removing it from the session.
    pub async fn take(session: &Session) -> Option<Self> {
        match session.remove::<Self>(keys::NOTICE).await {
            Ok(notice) => notice,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read notice from session");
                None
            }
        }
    }
}
