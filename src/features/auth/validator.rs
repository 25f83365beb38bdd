use super::model::{AuthenticatedUser, CustomClaims};
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    claims_namespace: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    // Standard JWT claims (validated by jsonwebtoken library)
    #[serde(rename = "jti", default)]
    _jti: Option<String>,
    sub: String,
    #[serde(rename = "iss")]
    _iss: String,
    #[serde(rename = "aud")]
    _aud: AudienceClaim,
    #[serde(rename = "iat")]
    _iat: u64,
    #[serde(rename = "exp")]
    _exp: u64,

    #[serde(default)]
    kind: Option<String>,
    #[serde(rename = "sessionUid", alias = "sid", default)]
    session_uid: Option<String>,

    /// Everything else, including the namespaced custom claims
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

/// Audience can be either a single string or an array of strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum AudienceClaim {
    Single(String),
    Multiple(Vec<String>),
}

impl Claims {
    /// Roles from the namespaced claim object, or a top-level `roles` array
    fn roles(&self, namespace: &str) -> Result<Vec<String>, AppError> {
        if let Some(value) = self.extra.get(namespace) {
            let custom: CustomClaims = serde_json::from_value(value.clone())
                .map_err(|e| AppError::Auth(format!("Invalid custom claims: {}", e)))?;
            return Ok(custom.roles);
        }
        match self.extra.get("roles") {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| AppError::Auth(format!("Invalid roles claim: {}", e))),
            None => Ok(Vec::new()),
        }
    }
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        claims_namespace: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            claims_namespace,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let claims = token_data.claims;

        // Tokens without a kind claim are accepted
        if let Some(kind) = &claims.kind {
            if kind != "AccessToken" {
                return Err(AppError::Auth("Token is not an access token".to_string()));
            }
        }

        let roles = claims.roles(&self.claims_namespace)?;

        Ok(AuthenticatedUser {
            sub: claims.sub,
            session_uid: claims.session_uid,
            roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACE: &str = "https://civictrack.app/claims";

    fn claims(json: &str) -> Claims {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_roles_from_namespaced_claims() {
        let claims = claims(
            r#"{"sub": "u1", "iss": "i", "aud": "a", "iat": 1, "exp": 2,
                "https://civictrack.app/claims": {"roles": ["moderator"]}}"#,
        );
        assert_eq!(claims.roles(NAMESPACE).unwrap(), vec!["moderator"]);
    }

    #[test]
    fn test_roles_fall_back_to_top_level() {
        let claims = claims(
            r#"{"sub": "u1", "iss": "i", "aud": ["a", "b"], "iat": 1, "exp": 2, "roles": ["admin"]}"#,
        );
        assert_eq!(claims.roles(NAMESPACE).unwrap(), vec!["admin"]);
    }

    #[test]
    fn test_missing_roles_is_empty() {
        let claims = claims(r#"{"sub": "u1", "iss": "i", "aud": "a", "iat": 1, "exp": 2}"#);
        assert!(claims.roles(NAMESPACE).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_roles_are_rejected() {
        let claims = claims(
            r#"{"sub": "u1", "iss": "i", "aud": "a", "iat": 1, "exp": 2, "roles": "admin"}"#,
        );
        assert!(matches!(claims.roles(NAMESPACE), Err(AppError::Auth(_))));
    }
}
