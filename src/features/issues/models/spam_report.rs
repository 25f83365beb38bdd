use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A citizen's spam report against an issue, joined for moderation views
#[derive(Debug, Clone, FromRow)]
pub struct SpamReportRow {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub issue_title: String,
    pub reporter_id: String,
    pub reporter_username: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Whether an issue with `count` spam reports must be hidden from citizens
pub fn should_hide(count: i32, threshold: i32) -> bool {
    threshold > 0 && count >= threshold
}
