use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::board::geo::CoordinateValue;
use crate::features::issues::models::{IssueActivity, IssueCategory, IssueRecord, IssueStatus};

/// Request DTO for reporting an issue
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateIssueDto {
    #[validate(length(min = 3, max = 150, message = "Title must be 3-150 characters"))]
    pub title: String,

    #[validate(length(min = 10, max = 2000, message = "Description must be 10-2000 characters"))]
    pub description: String,

    pub category: IssueCategory,

    #[validate(regex(
        path = "*crate::shared::validation::POSTAL_CODE_REGEX",
        message = "Postal code must be exactly 6 digits"
    ))]
    pub postal_code: String,

    #[validate(length(min = 1, max = 120, message = "Area is required"))]
    pub area: String,

    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub location_address: String,

    /// Pin position; missing or non-numeric values fall back to the postal-code centre
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub latitude: Option<CoordinateValue>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub longitude: Option<CoordinateValue>,

    #[serde(default)]
    pub is_anonymous: bool,

    /// URLs returned by `POST /api/issues/photos`
    #[serde(default)]
    #[validate(length(max = 5, message = "Maximum 5 photos allowed"))]
    pub photo_urls: Vec<String>,
}

/// Request DTO for editing an issue; unset fields are left unchanged
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateIssueDto {
    #[validate(length(min = 3, max = 150, message = "Title must be 3-150 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 10, max = 2000, message = "Description must be 10-2000 characters"))]
    pub description: Option<String>,

    pub category: Option<IssueCategory>,

    #[validate(length(min = 1, max = 120, message = "Area must not be empty"))]
    pub area: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Address must not be empty"))]
    pub location_address: Option<String>,
}

impl UpdateIssueDto {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.area.is_none()
            && self.location_address.is_none()
    }
}

/// Request DTO for flagging an issue as spam
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct SpamReportDto {
    #[validate(length(max = 500, message = "Reason must not exceed 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpamReportResponseDto {
    pub issue_id: Uuid,
    pub spam_reports: i32,
    pub hidden: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeletePhotoDto {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoUploadResponseDto {
    pub urls: Vec<String>,
}

/// Multipart form schema for photo uploads
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct PhotoUploadForm {
    /// One or more image files (JPEG, PNG or WebP, 5MB each, 5 at most)
    #[schema(value_type = Vec<String>, format = Binary)]
    pub photos: Vec<Vec<u8>>,
}

/// Full issue view with photos and activity log
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueDetailDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub category_label: String,
    pub status: IssueStatus,
    pub status_label: String,
    pub postal_code: String,
    pub area: String,
    pub location_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// "Anonymous" for anonymous issues
    pub reporter_name: String,
    pub is_anonymous: bool,
    /// Whether the caller reported this issue
    pub is_mine: bool,
    pub is_hidden: bool,
    pub spam_reports: i32,
    pub photos: Vec<String>,
    pub activity_log: Vec<IssueActivity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IssueDetailDto {
    pub fn from_record(issue: &IssueRecord, current_user: Option<&str>) -> Self {
        let position = issue.coordinates.resolve();
        Self {
            id: issue.id,
            title: issue.title.clone(),
            description: issue.description.clone(),
            category: issue.category,
            category_label: issue.category.label().to_string(),
            status: issue.status,
            status_label: issue.status.label().to_string(),
            postal_code: issue.postal_code.clone(),
            area: issue.area.clone(),
            location_address: issue.location_address.clone(),
            latitude: position.map(|p| p.lat),
            longitude: position.map(|p| p.lng),
            reporter_name: issue.reporter_display_name(),
            is_anonymous: issue.is_anonymous,
            is_mine: current_user.is_some_and(|user| issue.is_reported_by(user)),
            is_hidden: issue.is_hidden,
            spam_reports: issue.spam_reports,
            photos: issue.photos.clone(),
            activity_log: issue.activity_log.clone(),
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::issue_fixture;
    use serde_json::json;

    fn create_json() -> serde_json::Value {
        json!({
            "title": "Pothole near station",
            "description": "Deep pothole on the left lane near the bus stop",
            "category": "roads",
            "postal_code": "388001",
            "area": "Anand",
            "location_address": "Station Road"
        })
    }

    #[test]
    fn test_create_issue_defaults_and_validation() {
        let dto: CreateIssueDto = serde_json::from_value(create_json()).unwrap();
        assert!(dto.validate().is_ok());
        assert!(!dto.is_anonymous);
        assert!(dto.photo_urls.is_empty());
        assert!(dto.latitude.is_none());
    }

    #[test]
    fn test_create_issue_rejects_bad_postal_code_and_too_many_photos() {
        let mut value = create_json();
        value["postal_code"] = json!("38800");
        let dto: CreateIssueDto = serde_json::from_value(value).unwrap();
        assert!(dto.validate().is_err());

        let mut value = create_json();
        value["photo_urls"] = json!(["a", "b", "c", "d", "e", "f"]);
        let dto: CreateIssueDto = serde_json::from_value(value).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_issue_accepts_textual_coordinates() {
        let mut value = create_json();
        value["latitude"] = json!("abc");
        value["longitude"] = json!(72.9);
        let dto: CreateIssueDto = serde_json::from_value(value).unwrap();
        assert!(dto.latitude.and_then(|v| v.as_f64()).is_none());
        assert_eq!(dto.longitude.and_then(|v| v.as_f64()), Some(72.9));
    }

    #[test]
    fn test_detail_hides_anonymous_reporter() {
        let mut issue = issue_fixture("388001", IssueCategory::Water, IssueStatus::Reported);
        issue.is_anonymous = true;
        issue.reporter_id = Some("u1".to_string());

        let dto = IssueDetailDto::from_record(&issue, Some("u1"));
        assert_eq!(dto.reporter_name, "Anonymous");
        assert!(dto.is_mine);
        assert_eq!(dto.category_label, "Water Supply");

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("reporter_id").is_none());
    }
}
