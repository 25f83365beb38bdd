use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::dto::MeResponseDto;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::profiles::ProfileService;

pub struct AuthService {
    profiles: Arc<ProfileService>,
}

impl AuthService {
    pub fn new(profiles: Arc<ProfileService>) -> Self {
        Self { profiles }
    }

    pub async fn get_current_user(&self, user: AuthenticatedUser) -> Result<MeResponseDto> {
        let profile = self.profiles.find(&user.sub).await?;
        Ok(MeResponseDto {
            sub: user.sub,
            session_uid: user.session_uid,
            roles: user.roles,
            profile: profile.map(Into::into),
        })
    }
}
