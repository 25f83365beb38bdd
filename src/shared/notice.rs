//! Transient user-facing notices attached to API responses.
//!
//! Clients render a notice as a toast and drop it after `dismiss_after_ms`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::DEFAULT_NOTICE_DISMISS_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub dismiss_after_ms: u64,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            dismiss_after_ms: DEFAULT_NOTICE_DISMISS_MS,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn dismiss_after(mut self, millis: u64) -> Self {
        self.dismiss_after_ms = millis;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::ADMIN_NOTICE_DISMISS_MS;

    #[test]
    fn test_notice_defaults_to_citizen_dismiss_delay() {
        let notice = Notice::success("Issue reported successfully!");
        assert_eq!(notice.severity, Severity::Success);
        assert_eq!(notice.dismiss_after_ms, 3000);
    }

    #[test]
    fn test_notice_serializes_lowercase_severity() {
        let notice = Notice::warning("Please select issues").dismiss_after(ADMIN_NOTICE_DISMISS_MS);
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["dismiss_after_ms"], 5000);
    }
}
