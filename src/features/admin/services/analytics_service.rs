use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::{AdminIssueDto, AnalyticsDto, ChartDatasetDto, TopReporterDto};
use crate::features::issues::models::{IssueCategory, IssueRow, IssueStatus};
use crate::features::issues::services::{IssueService, ISSUE_SELECT};

/// Issue counts per category, every category present, labelled with display names
pub fn category_dataset(counts: &[(IssueCategory, i64)]) -> ChartDatasetDto {
    let by_category: HashMap<IssueCategory, i64> = counts.iter().copied().collect();
    ChartDatasetDto {
        labels: IssueCategory::ALL
            .iter()
            .map(|c| c.label().to_string())
            .collect(),
        values: IssueCategory::ALL
            .iter()
            .map(|c| by_category.get(c).copied().unwrap_or(0))
            .collect(),
    }
}

pub fn status_dataset(counts: &[(IssueStatus, i64)]) -> ChartDatasetDto {
    let by_status: HashMap<IssueStatus, i64> = counts.iter().copied().collect();
    ChartDatasetDto {
        labels: IssueStatus::ALL
            .iter()
            .map(|s| s.label().to_string())
            .collect(),
        values: IssueStatus::ALL
            .iter()
            .map(|s| by_status.get(s).copied().unwrap_or(0))
            .collect(),
    }
}

/// One `YYYY-MM-DD` point per day in `start..=end`; days without issues count zero
pub fn timeline_dataset(
    counts: &[(NaiveDate, i64)],
    start: NaiveDate,
    end: NaiveDate,
) -> ChartDatasetDto {
    let by_day: HashMap<NaiveDate, i64> = counts.iter().copied().collect();
    let mut dataset = ChartDatasetDto::default();
    for day in start.iter_days().take_while(|d| *d <= end) {
        dataset.labels.push(day.format("%Y-%m-%d").to_string());
        dataset.values.push(by_day.get(&day).copied().unwrap_or(0));
    }
    dataset
}

/// Chart data for the admin dashboard
pub struct AnalyticsService {
    pool: PgPool,
    issues: Arc<IssueService>,
}

impl AnalyticsService {
    pub fn new(pool: PgPool, issues: Arc<IssueService>) -> Self {
        Self { pool, issues }
    }

    pub async fn analytics(&self, days: i64) -> Result<AnalyticsDto> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(days - 1);
        let since = start.and_time(NaiveTime::MIN).and_utc();

        let categories = sqlx::query_as::<_, (IssueCategory, i64)>(
            "SELECT category, COUNT(*) FROM issues WHERE created_at >= $1 GROUP BY category",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count issues by category: {:?}", e);
            AppError::Database(e)
        })?;

        let statuses = sqlx::query_as::<_, (IssueStatus, i64)>(
            "SELECT status, COUNT(*) FROM issues WHERE created_at >= $1 GROUP BY status",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count issues by status: {:?}", e);
            AppError::Database(e)
        })?;

        let timeline = sqlx::query_as::<_, (NaiveDate, i64)>(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*)
            FROM issues
            WHERE created_at >= $1
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load issue timeline: {:?}", e);
            AppError::Database(e)
        })?;

        let top_reporters = sqlx::query_as::<_, TopReporterDto>(
            r#"
            SELECT p.username, COUNT(i.id) AS issue_count
            FROM profiles p
            JOIN issues i ON i.reporter_id = p.id
            WHERE p.is_banned = FALSE
            GROUP BY p.id, p.username
            ORDER BY issue_count DESC, p.username
            LIMIT 10
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load top reporters: {:?}", e);
            AppError::Database(e)
        })?;

        let recent = self.recent_issues().await?;

        Ok(AnalyticsDto {
            days,
            by_category: category_dataset(&categories),
            by_status: status_dataset(&statuses),
            timeline: timeline_dataset(&timeline, start, end),
            top_reporters,
            recent_issues: recent,
        })
    }

    async fn recent_issues(&self) -> Result<Vec<AdminIssueDto>> {
        let query = format!("{} ORDER BY i.created_at DESC LIMIT 10", ISSUE_SELECT);
        let rows = sqlx::query_as::<_, IssueRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load recent issues: {:?}", e);
                AppError::Database(e)
            })?;

        let records = self.issues.hydrate(rows).await?;
        Ok(records.iter().map(AdminIssueDto::from).collect())
    }
}
