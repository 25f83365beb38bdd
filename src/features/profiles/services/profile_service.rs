use sqlx::PgPool;

use crate::core::error::{map_constraint_error, AppError, Result};
use crate::features::profiles::dtos::CreateProfileDto;
use crate::features::profiles::models::{Profile, ProfileWithIssueCount};

const PROFILE_COLUMNS: &str =
    "id, username, email, phone, is_banned, created_at, updated_at";

/// Service for citizen profiles
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the profile for `sub`; one per subject, usernames unique
    pub async fn create(&self, sub: &str, dto: CreateProfileDto) -> Result<Profile> {
        let query = format!(
            r#"
            INSERT INTO profiles (id, username, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(sub)
            .bind(dto.username.trim())
            .bind(dto.email.as_deref().map(str::trim))
            .bind(dto.phone.as_deref().map(str::trim))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, "Profile already exists or username is taken"))?;

        tracing::info!("Profile created for {} ({})", profile.id, profile.username);
        Ok(profile)
    }

    pub async fn find(&self, sub: &str) -> Result<Option<Profile>> {
        let query = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);

        sqlx::query_as::<_, Profile>(&query)
            .bind(sub)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get profile: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn get(&self, sub: &str) -> Result<Profile> {
        self.find(sub)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    /// Profile of a user allowed to report; banned users are forbidden
    pub async fn require_active(&self, sub: &str) -> Result<Profile> {
        let profile = self.find(sub).await?.ok_or_else(|| {
            AppError::Forbidden("Create a profile before reporting issues".to_string())
        })?;

        if profile.is_banned {
            return Err(AppError::Forbidden(
                "Your account has been banned from reporting issues".to_string(),
            ));
        }
        Ok(profile)
    }

    /// Profiles with their reported issue counts, newest first (paginated)
    pub async fn list_with_issue_counts(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ProfileWithIssueCount>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count profiles: {:?}", e);
                AppError::Database(e)
            })?;

        let profiles = sqlx::query_as::<_, ProfileWithIssueCount>(
            r#"
            SELECT p.id, p.username, p.email, p.phone, p.is_banned, p.created_at,
                   COUNT(i.id) AS issue_count
            FROM profiles p
            LEFT JOIN issues i ON i.reporter_id = p.id
            GROUP BY p.id
            ORDER BY p.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list profiles: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((profiles, total))
    }

    /// Ban or unban every profile in `ids`; returns the number changed
    pub async fn set_banned(&self, ids: &[String], banned: bool) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET is_banned = $2, updated_at = NOW()
            WHERE id = ANY($1) AND is_banned <> $2
            "#,
        )
        .bind(ids)
        .bind(banned)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update ban status: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "{} {} profiles",
            if banned { "Banned" } else { "Unbanned" },
            result.rows_affected()
        );
        Ok(result.rows_affected())
    }

    /// Number of profiles that are not banned
    pub async fn count_active(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE is_banned = FALSE")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count active profiles: {:?}", e);
                AppError::Database(e)
            })
    }
}
