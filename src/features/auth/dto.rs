use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::profiles::dtos::ProfileResponseDto;

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_uid: Option<String>,
    pub roles: Vec<String>,
    /// Absent until the user has created a profile
    pub profile: Option<ProfileResponseDto>,
}
