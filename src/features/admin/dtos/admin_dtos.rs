use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::issues::models::{IssueCategory, IssueRecord, IssueStatus, SpamReportRow};
use crate::features::profiles::models::ProfileWithIssueCount;
use crate::shared::constants::MAX_PAGE_SIZE;
use crate::shared::types::{default_page, default_page_size, empty_string_as_none};

// =============================================================================
// ISSUE DTOs
// =============================================================================

/// Query params for listing issues
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AdminIssueQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Filter by status
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<IssueStatus>,
    /// Filter by category
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<IssueCategory>,
}

impl AdminIssueQueryParams {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Admin table row for an issue, hidden ones included
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminIssueDto {
    pub id: Uuid,
    pub title: String,
    pub category: IssueCategory,
    pub category_label: String,
    pub status: IssueStatus,
    pub status_label: String,
    pub postal_code: String,
    pub area: String,
    pub reporter_name: String,
    pub is_hidden: bool,
    pub spam_reports: i32,
    pub photo_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&IssueRecord> for AdminIssueDto {
    fn from(issue: &IssueRecord) -> Self {
        Self {
            id: issue.id,
            title: issue.title.clone(),
            category: issue.category,
            category_label: issue.category.label().to_string(),
            status: issue.status,
            status_label: issue.status.label().to_string(),
            postal_code: issue.postal_code.clone(),
            area: issue.area.clone(),
            reporter_name: issue.reporter_display_name(),
            is_hidden: issue.is_hidden,
            spam_reports: issue.spam_reports,
            photo_count: issue.photos.len(),
            created_at: issue.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusDto {
    pub status: IssueStatus,
}

/// Issues picked in the admin table
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IssueSelectionDto {
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkResultDto {
    pub affected: u64,
}

// =============================================================================
// USER DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminUserDto {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_banned: bool,
    pub issue_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileWithIssueCount> for AdminUserDto {
    fn from(profile: ProfileWithIssueCount) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            email: profile.email,
            phone: profile.phone,
            is_banned: profile.is_banned,
            issue_count: profile.issue_count,
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BanUsersDto {
    #[validate(length(min = 1, message = "Please select users"))]
    pub ids: Vec<String>,
    /// `false` lifts the ban
    pub banned: bool,
}

// =============================================================================
// SPAM REPORT DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminSpamReportDto {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub issue_title: String,
    pub reporter_id: String,
    pub reporter_username: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SpamReportRow> for AdminSpamReportDto {
    fn from(row: SpamReportRow) -> Self {
        Self {
            id: row.id,
            issue_id: row.issue_id,
            issue_title: row.issue_title,
            reporter_id: row.reporter_id,
            reporter_username: row.reporter_username,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// DASHBOARD DTOs
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AdminStatsDto {
    pub total_issues: i64,
    /// Issues still in `reported`
    pub pending_issues: i64,
    /// Issues marked `spam` or `invalid`
    pub spam_issues: i64,
    pub resolved_issues: i64,
    pub spam_reports: i64,
    /// Profiles that are not banned
    #[sqlx(default)]
    pub active_users: i64,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AnalyticsQueryParams {
    /// Days to look back, 1-365 (default: 30)
    #[serde(default = "default_days")]
    #[param(minimum = 1, maximum = 365)]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

impl AnalyticsQueryParams {
    pub fn days(&self) -> i64 {
        self.days.clamp(1, 365)
    }
}

/// Parallel label and value arrays for one chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartDatasetDto {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TopReporterDto {
    pub username: String,
    pub issue_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsDto {
    pub days: i64,
    pub by_category: ChartDatasetDto,
    pub by_status: ChartDatasetDto,
    /// One point per day, oldest first, zero-filled
    pub timeline: ChartDatasetDto,
    pub top_reporters: Vec<TopReporterDto>,
    /// The 10 latest issues
    pub recent_issues: Vec<AdminIssueDto>,
}
