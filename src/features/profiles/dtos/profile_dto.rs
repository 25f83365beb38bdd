use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::profiles::models::Profile;

/// Request DTO for creating the caller's profile after sign-up
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProfileDto {
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3-32 characters"),
        regex(
            path = "*crate::shared::validation::USERNAME_REGEX",
            message = "Username must start with letter or underscore and contain only alphanumeric characters and underscores"
        )
    )]
    pub username: String,

    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,

    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub phone: Option<String>,
}

/// Response DTO for profile data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponseDto {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponseDto {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            email: profile.email,
            phone: profile.phone,
            is_banned: profile.is_banned,
            created_at: profile.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(username: &str, email: Option<&str>) -> CreateProfileDto {
        CreateProfileDto {
            username: username.to_string(),
            email: email.map(str::to_string),
            phone: None,
        }
    }

    #[test]
    fn test_create_profile_validation() {
        assert!(dto("ravi_patel", Some("ravi@example.com")).validate().is_ok());
        assert!(dto("ab", None).validate().is_err());
        assert!(dto("9lives", None).validate().is_err());
        assert!(dto("ravi_patel", Some("not-an-email")).validate().is_err());
    }
}
