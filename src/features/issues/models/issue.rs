use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::board::geo::RawCoordinates;
use crate::shared::constants::ANONYMOUS_REPORTER;

/// Issue category enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "issue_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Roads,
    Lighting,
    Water,
    Cleanliness,
    Safety,
    Obstructions,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 6] = [
        IssueCategory::Roads,
        IssueCategory::Lighting,
        IssueCategory::Water,
        IssueCategory::Cleanliness,
        IssueCategory::Safety,
        IssueCategory::Obstructions,
    ];

    /// Human readable label shown on cards and charts
    pub fn label(&self) -> &'static str {
        match self {
            IssueCategory::Roads => "Roads",
            IssueCategory::Lighting => "Lighting",
            IssueCategory::Water => "Water Supply",
            IssueCategory::Cleanliness => "Cleanliness",
            IssueCategory::Safety => "Public Safety",
            IssueCategory::Obstructions => "Obstructions",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueCategory::Roads => write!(f, "roads"),
            IssueCategory::Lighting => write!(f, "lighting"),
            IssueCategory::Water => write!(f, "water"),
            IssueCategory::Cleanliness => write!(f, "cleanliness"),
            IssueCategory::Safety => write!(f, "safety"),
            IssueCategory::Obstructions => write!(f, "obstructions"),
        }
    }
}

/// Issue status enum matching database enum.
///
/// `Spam` and `Invalid` are moderation outcomes; citizens and admins share
/// the same enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "issue_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Reported,
    InProgress,
    Resolved,
    Spam,
    Invalid,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 5] = [
        IssueStatus::Reported,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
        IssueStatus::Spam,
        IssueStatus::Invalid,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IssueStatus::Reported => "Reported",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
            IssueStatus::Spam => "Spam",
            IssueStatus::Invalid => "Invalid",
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueStatus::Reported => write!(f, "reported"),
            IssueStatus::InProgress => write!(f, "in_progress"),
            IssueStatus::Resolved => write!(f, "resolved"),
            IssueStatus::Spam => write!(f, "spam"),
            IssueStatus::Invalid => write!(f, "invalid"),
        }
    }
}

/// Database row for an issue, joined with the reporter's username
#[derive(Debug, Clone, FromRow)]
pub struct IssueRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub status: IssueStatus,
    pub postal_code: String,
    pub area: String,
    pub location_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub reporter_id: Option<String>,
    pub reporter_username: Option<String>,
    pub is_anonymous: bool,
    pub is_hidden: bool,
    pub spam_reports: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct IssuePhoto {
    pub issue_id: Uuid,
    pub url: String,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct IssueActivity {
    #[serde(skip)]
    pub issue_id: Uuid,
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// An issue with its photos and activity log, as held by the board.
#[derive(Debug, Clone)]
pub struct IssueRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub status: IssueStatus,
    pub postal_code: String,
    pub area: String,
    pub location_address: String,
    pub coordinates: RawCoordinates,
    pub reporter_id: Option<String>,
    pub reporter_username: Option<String>,
    pub is_anonymous: bool,
    pub is_hidden: bool,
    pub spam_reports: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Photo URLs in upload order; the first is the cover
    pub photos: Vec<String>,
    /// Oldest first
    pub activity_log: Vec<IssueActivity>,
}

impl IssueRecord {
    pub fn from_row(row: IssueRow, photos: Vec<String>, activity_log: Vec<IssueActivity>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            status: row.status,
            postal_code: row.postal_code,
            area: row.area,
            location_address: row.location_address,
            coordinates: RawCoordinates::from_columns(row.latitude, row.longitude),
            reporter_id: row.reporter_id,
            reporter_username: row.reporter_username,
            is_anonymous: row.is_anonymous,
            is_hidden: row.is_hidden,
            spam_reports: row.spam_reports,
            created_at: row.created_at,
            updated_at: row.updated_at,
            photos,
            activity_log,
        }
    }

    pub fn cover_photo(&self) -> Option<&str> {
        self.photos.first().map(String::as_str)
    }

    /// Name shown for the reporter; never reveals an anonymous reporter
    pub fn reporter_display_name(&self) -> String {
        if self.is_anonymous {
            return ANONYMOUS_REPORTER.to_string();
        }
        self.reporter_username
            .clone()
            .unwrap_or_else(|| "User".to_string())
    }

    /// First `max_chars` characters of the description, with "..." when cut
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut chars = self.description.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }

    pub fn is_reported_by(&self, user_id: &str) -> bool {
        self.reporter_id.as_deref() == Some(user_id)
    }
}

/// Data for creating a new issue
#[derive(Debug)]
pub struct CreateIssue {
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub postal_code: String,
    pub area: String,
    pub location_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub reporter_id: Option<String>,
    pub is_anonymous: bool,
    pub photo_urls: Vec<String>,
}
