use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::board::filter::{IssueFilter, Ownership};
use crate::features::board::map_sync::{MapCenter, MapMarker, RadiusCircle, SyncReport};
use crate::features::board::pagination::PageControl;
use crate::features::board::session::ViewMode;
use crate::features::issues::models::{IssueCategory, IssueRecord, IssueStatus};
use crate::shared::constants::CARD_EXCERPT_CHARS;
use crate::shared::types::empty_string_as_none;

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateSessionDto {
    /// Load this postal code right away
    #[validate(regex(
        path = "*crate::shared::validation::POSTAL_CODE_REGEX",
        message = "Postal code must be exactly 6 digits"
    ))]
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SelectPostalCodeDto {
    #[validate(regex(
        path = "*crate::shared::validation::POSTAL_CODE_REGEX",
        message = "Postal code must be exactly 6 digits"
    ))]
    pub postal_code: String,
}

/// Grid filters; empty strings clear a predicate
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateFiltersDto {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<IssueCategory>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<IssueStatus>,
    /// Only issues reported by the caller
    #[serde(default)]
    pub mine: bool,
}

impl From<UpdateFiltersDto> for IssueFilter {
    fn from(dto: UpdateFiltersDto) -> Self {
        IssueFilter {
            category: dto.category,
            status: dto.status,
            ownership: if dto.mine {
                Ownership::Mine
            } else {
                Ownership::Any
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePageDto {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: usize,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetViewDto {
    pub view: ViewMode,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MapSettingsDto {
    /// Any positive radius; the board offers 1, 3 and 5 km
    pub radius_km: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<IssueCategory>,
}

/// Issue as shown on a grid card
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueCardDto {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub category: IssueCategory,
    pub category_label: String,
    pub status: IssueStatus,
    pub status_label: String,
    pub postal_code: String,
    pub area: String,
    pub location_address: String,
    pub cover_photo: Option<String>,
    pub photo_count: usize,
    pub reporter_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&IssueRecord> for IssueCardDto {
    fn from(issue: &IssueRecord) -> Self {
        Self {
            id: issue.id,
            title: issue.title.clone(),
            excerpt: issue.excerpt(CARD_EXCERPT_CHARS),
            category: issue.category,
            category_label: issue.category.label().to_string(),
            status: issue.status,
            status_label: issue.status.label().to_string(),
            postal_code: issue.postal_code.clone(),
            area: issue.area.clone(),
            location_address: issue.location_address.clone(),
            cover_photo: issue.cover_photo().map(str::to_string),
            photo_count: issue.photos.len(),
            reporter_name: issue.reporter_display_name(),
            created_at: issue.created_at,
        }
    }
}

/// Grid state of a board session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BoardViewDto {
    pub session_id: Uuid,
    /// Postal code of the loaded issues
    pub postal_code: Option<String>,
    /// Postal code currently being loaded, if any
    pub loading: Option<String>,
    pub view: ViewMode,
    pub filter: IssueFilter,
    pub total_issues: usize,
    pub matching_issues: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub issues: Vec<IssueCardDto>,
    pub controls: Vec<PageControl>,
}

/// Map state of a board session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MapViewDto {
    pub session_id: Uuid,
    pub center: Option<MapCenter>,
    pub radius_km: f64,
    pub radius_options_km: Vec<f64>,
    pub category: Option<IssueCategory>,
    pub circle: Option<RadiusCircle>,
    pub markers: Vec<MapMarker>,
    pub report: Option<SyncReport>,
}
