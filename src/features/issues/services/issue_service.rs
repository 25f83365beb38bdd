use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{map_constraint_error, AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::board::geo::LatLon;
use crate::features::board::source::IssueSource;
use crate::features::geocoding::services::LocationResolver;
use crate::features::issues::dtos::{CreateIssueDto, SpamReportResponseDto, UpdateIssueDto};
use crate::features::issues::models::{
    should_hide, CreateIssue, IssueActivity, IssuePhoto, IssueRecord, IssueRow,
};
use crate::features::issues::services::PhotoService;
use crate::features::profiles::ProfileService;

/// Issue columns joined with the reporter's username; append WHERE/ORDER clauses
pub(crate) const ISSUE_SELECT: &str = r#"
    SELECT i.id, i.title, i.description, i.category, i.status, i.postal_code, i.area,
           i.location_address, i.latitude, i.longitude, i.reporter_id,
           p.username AS reporter_username, i.is_anonymous, i.is_hidden, i.spam_reports,
           i.created_at, i.updated_at
    FROM issues i
    LEFT JOIN profiles p ON p.id = i.reporter_id
"#;

/// Attach photos and activity entries to their rows, keeping row order.
///
/// Photos are ordered by position, activities oldest first.
pub fn assemble_records(
    rows: Vec<IssueRow>,
    mut photos: Vec<IssuePhoto>,
    activities: Vec<IssueActivity>,
) -> Vec<IssueRecord> {
    photos.sort_by_key(|p| p.position);

    let mut photos_by_issue: HashMap<Uuid, Vec<String>> = HashMap::new();
    for photo in photos {
        photos_by_issue
            .entry(photo.issue_id)
            .or_default()
            .push(photo.url);
    }

    let mut activity_by_issue: HashMap<Uuid, Vec<IssueActivity>> = HashMap::new();
    for entry in activities {
        activity_by_issue.entry(entry.issue_id).or_default().push(entry);
    }
    for log in activity_by_issue.values_mut() {
        log.sort_by_key(|a| a.created_at);
    }

    rows.into_iter()
        .map(|row| {
            let photos = photos_by_issue.remove(&row.id).unwrap_or_default();
            let activity = activity_by_issue.remove(&row.id).unwrap_or_default();
            IssueRecord::from_row(row, photos, activity)
        })
        .collect()
}

/// Service for citizen issue operations
pub struct IssueService {
    pool: PgPool,
    profiles: Arc<ProfileService>,
    locations: Arc<LocationResolver>,
    photos: Arc<PhotoService>,
    spam_threshold: i32,
}

impl IssueService {
    pub fn new(
        pool: PgPool,
        profiles: Arc<ProfileService>,
        locations: Arc<LocationResolver>,
        photos: Arc<PhotoService>,
        spam_threshold: i32,
    ) -> Self {
        Self {
            pool,
            profiles,
            locations,
            photos,
            spam_threshold,
        }
    }

    pub fn photos(&self) -> &PhotoService {
        &self.photos
    }

    /// Load photos and activity logs for `rows` in two queries
    pub async fn hydrate(&self, rows: Vec<IssueRow>) -> Result<Vec<IssueRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let photos = sqlx::query_as::<_, IssuePhoto>(
            r#"
            SELECT issue_id, url, position
            FROM issue_photos
            WHERE issue_id = ANY($1)
            ORDER BY position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load issue photos: {:?}", e);
            AppError::Database(e)
        })?;

        let activities = sqlx::query_as::<_, IssueActivity>(
            r#"
            SELECT issue_id, action, description, created_at
            FROM issue_activities
            WHERE issue_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load issue activity: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(assemble_records(rows, photos, activities))
    }

    async fn fetch_one(&self, id: Uuid, include_hidden: bool) -> Result<IssueRecord> {
        let query = format!(
            "{} WHERE i.id = $1 AND ($2 OR i.is_hidden = FALSE)",
            ISSUE_SELECT
        );

        let row = sqlx::query_as::<_, IssueRow>(&query)
            .bind(id)
            .bind(include_hidden)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get issue: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Issue not found".to_string()))?;

        self.hydrate(vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Issue not found".to_string()))
    }

    /// Issue as citizens see it; hidden issues are not found
    pub async fn get_visible(&self, id: Uuid) -> Result<IssueRecord> {
        self.fetch_one(id, false).await
    }

    /// Issue including hidden ones, for moderators
    pub async fn find_any(&self, id: Uuid) -> Result<IssueRecord> {
        self.fetch_one(id, true).await
    }

    /// Coordinates from the request, else the postal-code centre or default centre
    async fn resolve_position(&self, dto: &CreateIssueDto) -> LatLon {
        let supplied = dto
            .latitude
            .as_ref()
            .and_then(|v| v.as_f64())
            .zip(dto.longitude.as_ref().and_then(|v| v.as_f64()))
            .and_then(|(lat, lng)| LatLon::checked(lat, lng));

        match supplied {
            Some(point) => point,
            None => {
                tracing::debug!(
                    "No usable coordinates for new issue, using center of {}",
                    dto.postal_code
                );
                self.locations
                    .resolve_postal_code(&dto.postal_code)
                    .await
                    .point
            }
        }
    }

    async fn insert_activity(
        tx: &mut Transaction<'_, Postgres>,
        issue_id: Uuid,
        action: &str,
        description: &str,
        user_id: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO issue_activities (issue_id, action, description, user_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(issue_id)
        .bind(action)
        .bind(description)
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record issue activity: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(())
    }

    /// Report a new issue with its photos and initial activity entry
    pub async fn create(&self, user: &AuthenticatedUser, dto: CreateIssueDto) -> Result<IssueRecord> {
        self.profiles.require_active(&user.sub).await?;
        self.photos.check_owned(&user.sub, &dto.photo_urls)?;

        let position = self.resolve_position(&dto).await;
        let data = CreateIssue {
            title: dto.title.trim().to_string(),
            description: dto.description.trim().to_string(),
            category: dto.category,
            postal_code: dto.postal_code,
            area: dto.area.trim().to_string(),
            location_address: dto.location_address.trim().to_string(),
            latitude: position.lat,
            longitude: position.lng,
            reporter_id: (!dto.is_anonymous).then(|| user.sub.clone()),
            is_anonymous: dto.is_anonymous,
            photo_urls: dto.photo_urls,
        };

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO issues (title, description, category, status, postal_code, area,
                                location_address, latitude, longitude, reporter_id, is_anonymous)
            VALUES ($1, $2, $3, 'reported', $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.category)
        .bind(&data.postal_code)
        .bind(&data.area)
        .bind(&data.location_address)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.reporter_id)
        .bind(data.is_anonymous)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, "Issue already exists"))?;

        for (position, url) in data.photo_urls.iter().enumerate() {
            sqlx::query("INSERT INTO issue_photos (issue_id, url, position) VALUES ($1, $2, $3)")
                .bind(id)
                .bind(url)
                .bind(position as i32)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to attach photo to issue: {:?}", e);
                    AppError::Database(e)
                })?;
        }

        Self::insert_activity(
            &mut tx,
            id,
            "reported",
            "Issue reported by user",
            Some(&user.sub),
        )
        .await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit issue: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Issue {} reported in {} ({} photos, anonymous: {})",
            id,
            data.postal_code,
            data.photo_urls.len(),
            data.is_anonymous
        );
        self.find_any(id).await
    }

    fn ensure_reporter(issue: &IssueRecord, sub: &str, action: &str) -> Result<()> {
        if issue.is_reported_by(sub) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "You can only {} issues you reported",
                action
            )))
        }
    }

    /// Edit an issue's text fields (reporter only)
    pub async fn update(&self, sub: &str, id: Uuid, dto: UpdateIssueDto) -> Result<IssueRecord> {
        if dto.is_empty() {
            return Err(AppError::Validation("Nothing to update".to_string()));
        }
        let issue = self.find_any(id).await?;
        Self::ensure_reporter(&issue, sub, "edit")?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query(
            r#"
            UPDATE issues
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                area = COALESCE($5, area),
                location_address = COALESCE($6, location_address),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(dto.description.as_deref().map(str::trim))
        .bind(dto.category)
        .bind(dto.area.as_deref().map(str::trim))
        .bind(dto.location_address.as_deref().map(str::trim))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update issue: {:?}", e);
            AppError::Database(e)
        })?;

        Self::insert_activity(&mut tx, id, "updated", "Issue details updated by reporter", Some(sub))
            .await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit issue update: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Issue {} updated by reporter", id);
        self.find_any(id).await
    }

    /// Delete an issue (reporter only)
    pub async fn delete(&self, sub: &str, id: Uuid) -> Result<()> {
        let issue = self.find_any(id).await?;
        Self::ensure_reporter(&issue, sub, "delete")?;
        self.purge(&[id]).await?;
        Ok(())
    }

    /// Delete issues and, best-effort, their stored photos
    pub async fn purge(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let urls: Vec<String> =
            sqlx::query_scalar("SELECT url FROM issue_photos WHERE issue_id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to list photos of deleted issues: {:?}", e);
                    AppError::Database(e)
                })?;

        let result = sqlx::query("DELETE FROM issues WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete issues: {:?}", e);
                AppError::Database(e)
            })?;

        self.photos.remove_many(&urls).await;
        tracing::info!("Deleted {} issues", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Flag an issue as spam; the issue is hidden once the threshold is reached
    pub async fn report_spam(
        &self,
        sub: &str,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<SpamReportResponseDto> {
        let issue = self.get_visible(id).await?;
        if issue.is_reported_by(sub) {
            return Err(AppError::BadRequest(
                "You cannot report your own issue as spam".to_string(),
            ));
        }
        self.profiles.require_active(sub).await?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query("INSERT INTO spam_reports (issue_id, reporter_id, reason) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(sub)
            .bind(reason.as_deref().map(str::trim).filter(|r| !r.is_empty()))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_constraint_error(e, "You have already reported this issue"))?;

        let count: i32 = sqlx::query_scalar(
            r#"
            UPDATE issues
            SET spam_reports = spam_reports + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING spam_reports
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count spam report: {:?}", e);
            AppError::Database(e)
        })?;

        let hidden = should_hide(count, self.spam_threshold);
        if hidden {
            sqlx::query("UPDATE issues SET is_hidden = TRUE WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to hide issue: {:?}", e);
                    AppError::Database(e)
                })?;
            Self::insert_activity(
                &mut tx,
                id,
                "hidden",
                &format!("Issue hidden after {} spam reports", count),
                None,
            )
            .await?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit spam report: {:?}", e);
            AppError::Database(e)
        })?;

        if hidden {
            tracing::info!("Issue {} hidden after {} spam reports", id, count);
        } else {
            tracing::debug!("Issue {} has {} spam reports", id, count);
        }

        Ok(SpamReportResponseDto {
            issue_id: id,
            spam_reports: count,
            hidden,
        })
    }
}

#[async_trait]
impl IssueSource for IssueService {
    async fn list_visible(&self, postal_code: &str) -> Result<Vec<IssueRecord>> {
        let query = format!(
            "{} WHERE i.postal_code = $1 AND i.is_hidden = FALSE ORDER BY i.created_at DESC",
            ISSUE_SELECT
        );

        let rows = sqlx::query_as::<_, IssueRow>(&query)
            .bind(postal_code)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list issues for {}: {:?}", postal_code, e);
                AppError::Database(e)
            })?;

        tracing::debug!("Loaded {} issues for {}", rows.len(), postal_code);
        self.hydrate(rows).await
    }
}
