use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::issues::dtos::{DeletePhotoDto, PhotoUploadForm, PhotoUploadResponseDto};
use crate::features::issues::services::{IssueService, PhotoUpload};
use crate::shared::notice::Notice;
use crate::shared::types::ApiResponse;

/// Upload photos for a new issue
///
/// Accepts multipart/form-data with one or more `photos` fields. The batch
/// is rejected as a whole if any photo has the wrong type or size.
#[utoipa::path(
    post,
    path = "/api/issues/photos",
    tag = "issues",
    request_body(
        content = PhotoUploadForm,
        content_type = "multipart/form-data",
        description = "One or more `photos` file fields",
    ),
    responses(
        (status = 201, description = "Photos uploaded", body = ApiResponse<PhotoUploadResponseDto>),
        (status = 400, description = "Invalid photo batch"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "Request too large"),
        (status = 500, description = "Storage failure")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_photos(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<PhotoUploadResponseDto>>)> {
    let mut photos: Vec<PhotoUpload> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "photos" {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string());
        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read photo bytes: {}", e);
            AppError::BadRequest(format!("Failed to read photo data: {}", e))
        })?;

        photos.push(PhotoUpload {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    let count = photos.len();
    let urls = service.photos().upload_batch(&user.sub, photos).await?;
    let message = if count == 1 {
        "Photo uploaded".to_string()
    } else {
        format!("{} photos uploaded", count)
    };

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(
                Some(PhotoUploadResponseDto { urls }),
                Some(message.clone()),
                None,
            )
            .with_notice(Notice::success(message)),
        ),
    ))
}

/// Remove an uploaded photo by its URL
#[utoipa::path(
    delete,
    path = "/api/issues/photos",
    tag = "issues",
    request_body = DeletePhotoDto,
    responses(
        (status = 200, description = "Photo removed"),
        (status = 400, description = "URL not served by our storage"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Photo belongs to another user")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_photo(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    AppJson(dto): AppJson<DeletePhotoDto>,
) -> Result<Json<ApiResponse<()>>> {
    service.photos().remove_by_url(&user.sub, &dto.url).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Photo removed".to_string()),
        None,
    )))
}
