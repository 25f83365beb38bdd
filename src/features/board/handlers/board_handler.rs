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
use crate::features::board::dtos::{
    BoardViewDto, ChangePageDto, CreateSessionDto, MapSettingsDto, MapViewDto,
    SelectPostalCodeDto, SetViewDto, UpdateFiltersDto,
};
use crate::features::board::services::BoardService;
use crate::features::board::session::MapSettings;
use crate::shared::types::ApiResponse;

/// Open a board session
///
/// When `postal_code` is given its issues are loaded before responding.
#[utoipa::path(
    post,
    path = "/api/board/sessions",
    tag = "board",
    request_body = CreateSessionDto,
    responses(
        (status = 201, description = "Session opened", body = ApiResponse<BoardViewDto>),
        (status = 400, description = "Invalid postal code"),
        (status = 500, description = "Issues could not be loaded")
    )
)]
pub async fn create_session(
    user: MaybeUser,
    State(service): State<Arc<BoardService>>,
    AppJson(dto): AppJson<CreateSessionDto>,
) -> Result<(StatusCode, Json<ApiResponse<BoardViewDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let view = service
        .create_session(dto.postal_code.as_deref(), user.sub())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(view), None, None)),
    ))
}

/// Grid state: current page of issue cards, filters and page controls
#[utoipa::path(
    get,
    path = "/api/board/sessions/{id}",
    tag = "board",
    params(
        ("id" = Uuid, Path, description = "Board session ID")
    ),
    responses(
        (status = 200, description = "Board view", body = ApiResponse<BoardViewDto>),
        (status = 404, description = "Session not found or expired")
    )
)]
pub async fn get_session(
    State(service): State<Arc<BoardService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BoardViewDto>>> {
    let view = service.view(id).await?;
    Ok(Json(ApiResponse::success(Some(view), None, None)))
}

/// Load the issues of a postal code
#[utoipa::path(
    put,
    path = "/api/board/sessions/{id}/postal-code",
    tag = "board",
    params(
        ("id" = Uuid, Path, description = "Board session ID")
    ),
    request_body = SelectPostalCodeDto,
    responses(
        (status = 200, description = "Issues loaded", body = ApiResponse<BoardViewDto>),
        (status = 400, description = "Invalid postal code"),
        (status = 404, description = "Session not found or expired"),
        (status = 500, description = "Issues could not be loaded")
    )
)]
pub async fn select_postal_code(
    user: MaybeUser,
    State(service): State<Arc<BoardService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SelectPostalCodeDto>,
) -> Result<Json<ApiResponse<BoardViewDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let view = service
        .select_postal_code(id, &dto.postal_code, user.sub())
        .await?;
    Ok(Json(ApiResponse::success(Some(view), None, None)))
}

/// Replace the grid filters
///
/// `mine` matches issues reported by the bearer user and nothing for guests.
#[utoipa::path(
    put,
    path = "/api/board/sessions/{id}/filters",
    tag = "board",
    params(
        ("id" = Uuid, Path, description = "Board session ID")
    ),
    request_body = UpdateFiltersDto,
    responses(
        (status = 200, description = "Filters applied", body = ApiResponse<BoardViewDto>),
        (status = 404, description = "Session not found or expired")
    )
)]
pub async fn update_filters(
    user: MaybeUser,
    State(service): State<Arc<BoardService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateFiltersDto>,
) -> Result<Json<ApiResponse<BoardViewDto>>> {
    let view = service.update_filters(id, dto.into(), user.sub()).await?;
    Ok(Json(ApiResponse::success(Some(view), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/board/sessions/{id}/page",
    tag = "board",
    params(
        ("id" = Uuid, Path, description = "Board session ID")
    ),
    request_body = ChangePageDto,
    responses(
        (status = 200, description = "Page changed", body = ApiResponse<BoardViewDto>),
        (status = 400, description = "Invalid page"),
        (status = 404, description = "Session not found or expired")
    )
)]
pub async fn change_page(
    State(service): State<Arc<BoardService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ChangePageDto>,
) -> Result<Json<ApiResponse<BoardViewDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let view = service.change_page(id, dto.page).await?;
    Ok(Json(ApiResponse::success(Some(view), None, None)))
}

/// Switch between grid and map view
#[utoipa::path(
    put,
    path = "/api/board/sessions/{id}/view",
    tag = "board",
    params(
        ("id" = Uuid, Path, description = "Board session ID")
    ),
    request_body = SetViewDto,
    responses(
        (status = 200, description = "View changed", body = ApiResponse<BoardViewDto>),
        (status = 404, description = "Session not found or expired")
    )
)]
pub async fn set_view_mode(
    State(service): State<Arc<BoardService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SetViewDto>,
) -> Result<Json<ApiResponse<BoardViewDto>>> {
    let view = service.set_view_mode(id, dto.view).await?;
    Ok(Json(ApiResponse::success(Some(view), None, None)))
}

/// Markers, radius circle and last sync report
#[utoipa::path(
    get,
    path = "/api/board/sessions/{id}/map",
    tag = "board",
    params(
        ("id" = Uuid, Path, description = "Board session ID")
    ),
    responses(
        (status = 200, description = "Map state", body = ApiResponse<MapViewDto>),
        (status = 404, description = "Session not found or expired")
    )
)]
pub async fn get_map(
    State(service): State<Arc<BoardService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MapViewDto>>> {
    let map = service.map_view(id).await?;
    Ok(Json(ApiResponse::success(Some(map), None, None)))
}

/// Change the map radius and category, then resync markers
#[utoipa::path(
    put,
    path = "/api/board/sessions/{id}/map",
    tag = "board",
    params(
        ("id" = Uuid, Path, description = "Board session ID")
    ),
    request_body = MapSettingsDto,
    responses(
        (status = 200, description = "Map resynced", body = ApiResponse<MapViewDto>),
        (status = 400, description = "Radius is not a positive number"),
        (status = 404, description = "Session not found or expired")
    )
)]
pub async fn update_map_settings(
    State(service): State<Arc<BoardService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<MapSettingsDto>,
) -> Result<Json<ApiResponse<MapViewDto>>> {
    let settings = MapSettings {
        radius_km: dto.radius_km,
        category: dto.category,
    };
    let map = service.update_map_settings(id, settings).await?;
    Ok(Json(ApiResponse::success(Some(map), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/board/sessions/{id}",
    tag = "board",
    params(
        ("id" = Uuid, Path, description = "Board session ID")
    ),
    responses(
        (status = 200, description = "Session closed"),
        (status = 404, description = "Session not found or expired")
    )
)]
pub async fn close_session(
    State(service): State<Arc<BoardService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.close_session(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Session closed".to_string()),
        None,
    )))
}
