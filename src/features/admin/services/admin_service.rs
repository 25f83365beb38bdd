use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::*;
use crate::features::issues::dtos::IssueDetailDto;
use crate::features::issues::models::{IssueCategory, IssueRow, IssueStatus, SpamReportRow};
use crate::features::issues::services::{IssueService, ISSUE_SELECT};
use crate::features::profiles::ProfileService;

use super::AnalyticsService;

/// Service for moderation and dashboard queries
pub struct AdminService {
    pool: PgPool,
    issues: Arc<IssueService>,
    profiles: Arc<ProfileService>,
    analytics: AnalyticsService,
}

impl AdminService {
    pub fn new(pool: PgPool, issues: Arc<IssueService>, profiles: Arc<ProfileService>) -> Self {
        Self {
            analytics: AnalyticsService::new(pool.clone(), issues.clone()),
            pool,
            issues,
            profiles,
        }
    }

    // =========================================================================
    // ISSUES
    // =========================================================================

    /// List issues with optional status/category filters (includes hidden issues)
    pub async fn list_issues(
        &self,
        status: Option<IssueStatus>,
        category: Option<IssueCategory>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AdminIssueDto>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM issues i
            WHERE ($1::issue_status IS NULL OR i.status = $1)
              AND ($2::issue_category IS NULL OR i.category = $2)
            "#,
        )
        .bind(status)
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count issues: {:?}", e);
            AppError::Database(e)
        })?;

        let query = format!(
            r#"{}
            WHERE ($1::issue_status IS NULL OR i.status = $1)
              AND ($2::issue_category IS NULL OR i.category = $2)
            ORDER BY i.created_at DESC
            OFFSET $3 LIMIT $4"#,
            ISSUE_SELECT
        );
        let rows = sqlx::query_as::<_, IssueRow>(&query)
            .bind(status)
            .bind(category)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list issues: {:?}", e);
                AppError::Database(e)
            })?;

        let items = self.to_admin_dtos(rows).await?;
        Ok((items, total))
    }

    /// Issues marked `spam` or `invalid`, awaiting approval or deletion
    pub async fn list_moderation_queue(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AdminIssueDto>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM issues WHERE status IN ('spam', 'invalid')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count moderation queue: {:?}", e);
            AppError::Database(e)
        })?;

        let query = format!(
            r#"{}
            WHERE i.status IN ('spam', 'invalid')
            ORDER BY i.created_at DESC
            OFFSET $1 LIMIT $2"#,
            ISSUE_SELECT
        );
        let rows = sqlx::query_as::<_, IssueRow>(&query)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list moderation queue: {:?}", e);
                AppError::Database(e)
            })?;

        let items = self.to_admin_dtos(rows).await?;
        Ok((items, total))
    }

    async fn to_admin_dtos(&self, rows: Vec<IssueRow>) -> Result<Vec<AdminIssueDto>> {
        let records = self.issues.hydrate(rows).await?;
        Ok(records.iter().map(AdminIssueDto::from).collect())
    }

    pub async fn get_issue(&self, id: Uuid) -> Result<IssueDetailDto> {
        let issue = self.issues.find_any(id).await?;
        Ok(IssueDetailDto::from_record(&issue, None))
    }

    /// Set any status and log it on the issue's activity
    pub async fn update_status(
        &self,
        admin_id: &str,
        id: Uuid,
        status: IssueStatus,
    ) -> Result<IssueDetailDto> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let result = sqlx::query("UPDATE issues SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update issue status: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Issue not found".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO issue_activities (issue_id, action, description, user_id)
            VALUES ($1, 'status_updated', $2, $3)
            "#,
        )
        .bind(id)
        .bind(format!("Status updated to {} by admin", status))
        .bind(admin_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record status activity: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit status update: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Issue {} set to {} by {}", id, status, admin_id);
        self.get_issue(id).await
    }

    /// Return issues to `reported` and make them visible again
    pub async fn approve(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Err(AppError::Validation(
                "Please select issues to approve".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE issues
            SET status = 'reported', is_hidden = FALSE, updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to approve issues: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Approved {} issues", result.rows_affected());
        Ok(result.rows_affected())
    }

    pub async fn delete_issues(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Err(AppError::Validation(
                "Please select issues to delete".to_string(),
            ));
        }
        self.issues.purge(ids).await
    }

    pub async fn delete_issue(&self, id: Uuid) -> Result<()> {
        if self.issues.purge(&[id]).await? == 0 {
            return Err(AppError::NotFound("Issue not found".to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // USERS
    // =========================================================================

    pub async fn list_users(&self, offset: i64, limit: i64) -> Result<(Vec<AdminUserDto>, i64)> {
        let (profiles, total) = self.profiles.list_with_issue_counts(offset, limit).await?;
        Ok((profiles.into_iter().map(AdminUserDto::from).collect(), total))
    }

    pub async fn set_banned(&self, admin_id: &str, ids: &[String], banned: bool) -> Result<u64> {
        if banned && ids.iter().any(|id| id == admin_id) {
            return Err(AppError::BadRequest("You cannot ban yourself".to_string()));
        }
        self.profiles.set_banned(ids, banned).await
    }

    // =========================================================================
    // SPAM REPORTS
    // =========================================================================

    pub async fn list_spam_reports(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AdminSpamReportDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM spam_reports")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count spam reports: {:?}", e);
                AppError::Database(e)
            })?;

        let rows = sqlx::query_as::<_, SpamReportRow>(
            r#"
            SELECT s.id, s.issue_id, i.title AS issue_title, s.reporter_id,
                   p.username AS reporter_username, s.reason, s.created_at
            FROM spam_reports s
            JOIN issues i ON i.id = s.issue_id
            LEFT JOIN profiles p ON p.id = s.reporter_id
            ORDER BY s.created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list spam reports: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows.into_iter().map(AdminSpamReportDto::from).collect(), total))
    }

    /// Delete a spam report and take it off the issue's counter
    pub async fn dismiss_spam_report(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let issue_id: Uuid =
            sqlx::query_scalar("DELETE FROM spam_reports WHERE id = $1 RETURNING issue_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to dismiss spam report: {:?}", e);
                    AppError::Database(e)
                })?
                .ok_or_else(|| AppError::NotFound("Spam report not found".to_string()))?;

        sqlx::query(
            "UPDATE issues SET spam_reports = GREATEST(spam_reports - 1, 0) WHERE id = $1",
        )
        .bind(issue_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update spam counter: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit spam report dismissal: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Spam report {} on issue {} dismissed", id, issue_id);
        Ok(())
    }

    // =========================================================================
    // DASHBOARD
    // =========================================================================

    pub async fn stats(&self) -> Result<AdminStatsDto> {
        let mut stats = sqlx::query_as::<_, AdminStatsDto>(
            r#"
            SELECT
                COUNT(*) AS total_issues,
                COUNT(*) FILTER (WHERE status = 'reported') AS pending_issues,
                COUNT(*) FILTER (WHERE status IN ('spam', 'invalid')) AS spam_issues,
                COUNT(*) FILTER (WHERE status = 'resolved') AS resolved_issues,
                (SELECT COUNT(*) FROM spam_reports) AS spam_reports
            FROM issues
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load dashboard stats: {:?}", e);
            AppError::Database(e)
        })?;

        stats.active_users = self.profiles.count_active().await?;
        Ok(stats)
    }

    pub async fn analytics(&self, days: i64) -> Result<AnalyticsDto> {
        self.analytics.analytics(days).await
    }
}
