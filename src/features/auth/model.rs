use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_MODERATOR};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject of the access token; also the profile id
    pub sub: String,
    /// Session UID (only present for interactive OIDC flows)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_uid: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    pub fn is_moderator(&self) -> bool {
        self.has_role(ROLE_MODERATOR)
    }

    /// Admins and moderators may use the admin dashboard
    pub fn has_moderation_access(&self) -> bool {
        self.is_admin() || self.is_moderator()
    }
}

/// Role claims carried under the configured namespace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomClaims {
    #[serde(default)]
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        create_admin_user, create_citizen_user, create_moderator_user,
    };

    #[test]
    fn test_role_checks() {
        assert!(create_admin_user().has_moderation_access());
        assert!(create_moderator_user().has_moderation_access());
        assert!(!create_moderator_user().is_admin());
        assert!(!create_citizen_user().has_moderation_access());
    }
}
