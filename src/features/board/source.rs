use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::issues::models::IssueRecord;

/// Read side of the issue data store used by board sessions.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Visible (not hidden) issues for `postal_code`, newest first
    async fn list_visible(&self, postal_code: &str) -> Result<Vec<IssueRecord>>;
}
