use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::{RequireAdmin, RequireModerator};
use crate::features::issues::dtos::IssueDetailDto;
use crate::shared::constants::ADMIN_NOTICE_DISMISS_MS;
use crate::shared::notice::Notice;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

fn admin_notice(notice: Notice) -> Notice {
    notice.dismiss_after(ADMIN_NOTICE_DISMISS_MS)
}

/// 400 with a warning notice for bulk actions submitted without a selection
fn empty_selection(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(
            ApiResponse::<()>::error(Some(message.to_string()), None)
                .with_notice(admin_notice(Notice::warning(message))),
        ),
    )
        .into_response()
}

fn done<T>(data: T, message: String) -> Json<ApiResponse<T>> {
    Json(
        ApiResponse::success(Some(data), Some(message.clone()), None)
            .with_notice(admin_notice(Notice::success(message))),
    )
}

// =============================================================================
// ISSUES
// =============================================================================

/// List all issues, hidden ones included (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/issues",
    params(AdminIssueQueryParams),
    responses(
        (status = 200, description = "List of issues", body = ApiResponse<Vec<AdminIssueDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin or moderator access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_issues(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<AdminIssueQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminIssueDto>>>> {
    let (items, total) = service
        .list_issues(params.status, params.category, params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Issues marked spam or invalid (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/issues/moderation",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Moderation queue", body = ApiResponse<Vec<AdminIssueDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin or moderator access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_moderation_queue(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AdminIssueDto>>>> {
    let (items, total) = service
        .list_moderation_queue(params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/issues/{id}",
    operation_id = "admin_get_issue",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Issue with photos and activity", body = ApiResponse<IssueDetailDto>),
        (status = 404, description = "Issue not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_issue(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssueDetailDto>>> {
    let issue = service.get_issue(id).await?;
    Ok(Json(ApiResponse::success(Some(issue), None, None)))
}

/// Set an issue's status
#[utoipa::path(
    patch,
    path = "/api/admin/issues/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    request_body = UpdateStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<IssueDetailDto>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Issue not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_issue_status(
    RequireModerator(user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateStatusDto>,
) -> Result<Json<ApiResponse<IssueDetailDto>>> {
    let issue = service.update_status(&user.sub, id, dto.status).await?;
    let message = format!("Status updated to {}", dto.status.label());
    Ok(done(issue, message))
}

/// Approve issues: back to `reported` and visible
#[utoipa::path(
    post,
    path = "/api/admin/issues/approve",
    request_body = IssueSelectionDto,
    responses(
        (status = 200, description = "Issues approved", body = ApiResponse<BulkResultDto>),
        (status = 400, description = "No issues selected")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn approve_issues(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<IssueSelectionDto>,
) -> Result<Response> {
    if dto.ids.is_empty() {
        return Ok(empty_selection("Please select issues to approve"));
    }

    let affected = service.approve(&dto.ids).await?;
    let message = format!("{} issue(s) approved", affected);
    Ok(done(BulkResultDto { affected }, message).into_response())
}

/// Delete the selected issues and their photos
#[utoipa::path(
    post,
    path = "/api/admin/issues/bulk-delete",
    request_body = IssueSelectionDto,
    responses(
        (status = 200, description = "Issues deleted", body = ApiResponse<BulkResultDto>),
        (status = 400, description = "No issues selected")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn bulk_delete_issues(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<IssueSelectionDto>,
) -> Result<Response> {
    if dto.ids.is_empty() {
        return Ok(empty_selection("Please select issues to delete"));
    }

    let affected = service.delete_issues(&dto.ids).await?;
    let message = format!("{} issue(s) deleted", affected);
    Ok(done(BulkResultDto { affected }, message).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/admin/issues/{id}",
    operation_id = "admin_delete_issue",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Issue deleted"),
        (status = 404, description = "Issue not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_issue(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_issue(id).await?;
    Ok(done((), "Issue deleted".to_string()))
}

// =============================================================================
// USERS
// =============================================================================

/// List profiles with their issue counts (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of users", body = ApiResponse<Vec<AdminUserDto>>),
        (status = 403, description = "Forbidden - Admin or moderator access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AdminUserDto>>>> {
    let (items, total) = service.list_users(params.offset(), params.limit()).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Ban or unban users
#[utoipa::path(
    post,
    path = "/api/admin/users/ban",
    request_body = BanUsersDto,
    responses(
        (status = 200, description = "Ban status updated", body = ApiResponse<BulkResultDto>),
        (status = 400, description = "No users selected"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn ban_users(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<BanUsersDto>,
) -> Result<Json<ApiResponse<BulkResultDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let affected = service.set_banned(&user.sub, &dto.ids, dto.banned).await?;
    let message = format!(
        "{} user(s) {}",
        affected,
        if dto.banned { "banned" } else { "unbanned" }
    );
    Ok(done(BulkResultDto { affected }, message))
}

// =============================================================================
// SPAM REPORTS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/spam-reports",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of spam reports", body = ApiResponse<Vec<AdminSpamReportDto>>),
        (status = 403, description = "Forbidden - Admin or moderator access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_spam_reports(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AdminSpamReportDto>>>> {
    let (items, total) = service
        .list_spam_reports(params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Dismiss a spam report
#[utoipa::path(
    delete,
    path = "/api/admin/spam-reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Spam report ID")
    ),
    responses(
        (status = 200, description = "Spam report dismissed"),
        (status = 404, description = "Spam report not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn dismiss_spam_report(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.dismiss_spam_report(id).await?;
    Ok(done((), "Spam report dismissed".to_string()))
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Dashboard counters", body = ApiResponse<AdminStatsDto>),
        (status = 403, description = "Forbidden - Admin or moderator access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_stats(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<AdminStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Chart datasets for the last `days` days
#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    params(AnalyticsQueryParams),
    responses(
        (status = 200, description = "Analytics datasets", body = ApiResponse<AnalyticsDto>),
        (status = 403, description = "Forbidden - Admin or moderator access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_analytics(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<AnalyticsQueryParams>,
) -> Result<Json<ApiResponse<AnalyticsDto>>> {
    let analytics = service.analytics(params.days()).await?;
    Ok(Json(ApiResponse::success(Some(analytics), None, None)))
}
