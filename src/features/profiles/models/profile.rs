use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Citizen profile keyed by the identity provider's subject
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile row with the number of issues the user reported
#[derive(Debug, Clone, FromRow)]
pub struct ProfileWithIssueCount {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub issue_count: i64,
}
