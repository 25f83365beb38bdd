use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, MaybeUser};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::issues::dtos::{
    CreateIssueDto, IssueDetailDto, SpamReportDto, SpamReportResponseDto, UpdateIssueDto,
};
use crate::features::issues::services::IssueService;
use crate::shared::notice::Notice;
use crate::shared::types::ApiResponse;

/// Get an issue with its photos and activity log
#[utoipa::path(
    get,
    path = "/api/issues/{id}",
    tag = "issues",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Issue retrieved", body = ApiResponse<IssueDetailDto>),
        (status = 404, description = "Issue not found or hidden")
    )
)]
pub async fn get_issue(
    user: MaybeUser,
    State(service): State<Arc<IssueService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssueDetailDto>>> {
    let issue = service.get_visible(id).await?;
    let dto = IssueDetailDto::from_record(&issue, user.sub());
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Report a new issue
///
/// Photos must be uploaded first via `POST /api/issues/photos`; pass the
/// returned URLs in `photo_urls`.
#[utoipa::path(
    post,
    path = "/api/issues",
    tag = "issues",
    request_body = CreateIssueDto,
    responses(
        (status = 201, description = "Issue reported", body = ApiResponse<IssueDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Profile missing or banned")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_issue(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    AppJson(dto): AppJson<CreateIssueDto>,
) -> Result<(StatusCode, Json<ApiResponse<IssueDetailDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let issue = service.create(&user, dto).await?;
    let message = "Issue reported successfully!";
    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(
                Some(IssueDetailDto::from_record(&issue, Some(&user.sub))),
                Some(message.to_string()),
                None,
            )
            .with_notice(Notice::success(message)),
        ),
    ))
}

/// Edit an issue you reported
#[utoipa::path(
    patch,
    path = "/api/issues/{id}",
    tag = "issues",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    request_body = UpdateIssueDto,
    responses(
        (status = 200, description = "Issue updated", body = ApiResponse<IssueDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the reporter"),
        (status = 404, description = "Issue not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_issue(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateIssueDto>,
) -> Result<Json<ApiResponse<IssueDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let issue = service.update(&user.sub, id, dto).await?;
    let message = "Issue updated successfully";
    Ok(Json(
        ApiResponse::success(
            Some(IssueDetailDto::from_record(&issue, Some(&user.sub))),
            Some(message.to_string()),
            None,
        )
        .with_notice(Notice::success(message)),
    ))
}

/// Delete an issue you reported
#[utoipa::path(
    delete,
    path = "/api/issues/{id}",
    tag = "issues",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Issue deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the reporter"),
        (status = 404, description = "Issue not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_issue(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user.sub, id).await?;
    let message = "Issue deleted";
    Ok(Json(
        ApiResponse::success(None, Some(message.to_string()), None)
            .with_notice(Notice::success(message)),
    ))
}

/// Flag an issue as spam
///
/// Each user may report an issue once. The issue is hidden from the board
/// once it collects enough reports.
#[utoipa::path(
    post,
    path = "/api/issues/{id}/spam-reports",
    tag = "issues",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    request_body = SpamReportDto,
    responses(
        (status = 201, description = "Spam report recorded", body = ApiResponse<SpamReportResponseDto>),
        (status = 400, description = "Own issue or validation error"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Issue not found"),
        (status = 409, description = "Already reported")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn report_spam(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SpamReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<SpamReportResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = service.report_spam(&user.sub, id, dto.reason).await?;
    let message = if report.hidden {
        "Thanks for the report. This issue is now hidden pending review."
    } else {
        "Thanks for the report. Moderators will review this issue."
    };
    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(Some(report), Some(message.to_string()), None)
                .with_notice(Notice::info(message)),
        ),
    ))
}
