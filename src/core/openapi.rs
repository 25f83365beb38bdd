use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::board::{
    dtos as board_dtos, filter as board_filter, geo as board_geo, handlers as board_handlers,
    map_sync as board_map, pagination as board_pagination, session as board_session,
};
use crate::features::geocoding::{dtos as geocoding_dtos, handlers as geocoding_handlers};
use crate::features::issues::{
    dtos as issues_dtos, handlers as issues_handlers, models as issues_models,
};
use crate::features::profiles::{dtos as profiles_dtos, handlers as profiles_handlers};
use crate::shared::notice::{Notice, Severity};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Profiles
        profiles_handlers::create_profile,
        profiles_handlers::get_my_profile,
        // Issues
        issues_handlers::create_issue,
        issues_handlers::get_issue,
        issues_handlers::update_issue,
        issues_handlers::delete_issue,
        issues_handlers::report_spam,
        issues_handlers::upload_photos,
        issues_handlers::delete_photo,
        // Board
        board_handlers::create_session,
        board_handlers::get_session,
        board_handlers::select_postal_code,
        board_handlers::update_filters,
        board_handlers::change_page,
        board_handlers::set_view_mode,
        board_handlers::get_map,
        board_handlers::update_map_settings,
        board_handlers::close_session,
        // Geocoding
        geocoding_handlers::locate_postal_code,
        geocoding_handlers::search_address,
        geocoding_handlers::reverse_geocode,
        // Admin
        admin_handlers::list_issues,
        admin_handlers::list_moderation_queue,
        admin_handlers::get_issue,
        admin_handlers::update_issue_status,
        admin_handlers::approve_issues,
        admin_handlers::bulk_delete_issues,
        admin_handlers::delete_issue,
        admin_handlers::list_users,
        admin_handlers::ban_users,
        admin_handlers::list_spam_reports,
        admin_handlers::dismiss_spam_report,
        admin_handlers::get_stats,
        admin_handlers::get_analytics,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Notice,
            Severity,
            // Auth
            auth::dto::MeResponseDto,
            auth::model::AuthenticatedUser,
            ApiResponse<auth::dto::MeResponseDto>,
            // Profiles
            profiles_dtos::CreateProfileDto,
            profiles_dtos::ProfileResponseDto,
            ApiResponse<profiles_dtos::ProfileResponseDto>,
            // Issues
            issues_models::IssueCategory,
            issues_models::IssueStatus,
            issues_models::IssueActivity,
            issues_dtos::CreateIssueDto,
            issues_dtos::UpdateIssueDto,
            issues_dtos::IssueDetailDto,
            issues_dtos::SpamReportDto,
            issues_dtos::SpamReportResponseDto,
            issues_dtos::PhotoUploadForm,
            issues_dtos::PhotoUploadResponseDto,
            issues_dtos::DeletePhotoDto,
            ApiResponse<issues_dtos::IssueDetailDto>,
            ApiResponse<issues_dtos::SpamReportResponseDto>,
            ApiResponse<issues_dtos::PhotoUploadResponseDto>,
            // Board
            board_geo::LatLon,
            board_geo::CoordinateValue,
            board_geo::RawCoordinates,
            board_filter::Ownership,
            board_filter::IssueFilter,
            board_pagination::PageControl,
            board_session::ViewMode,
            board_session::MapSettings,
            board_map::CenterSource,
            board_map::MapCenter,
            board_map::RadiusCircle,
            board_map::MapMarker,
            board_map::SyncReport,
            board_dtos::CreateSessionDto,
            board_dtos::SelectPostalCodeDto,
            board_dtos::UpdateFiltersDto,
            board_dtos::ChangePageDto,
            board_dtos::SetViewDto,
            board_dtos::MapSettingsDto,
            board_dtos::IssueCardDto,
            board_dtos::BoardViewDto,
            board_dtos::MapViewDto,
            ApiResponse<board_dtos::BoardViewDto>,
            ApiResponse<board_dtos::MapViewDto>,
            // Geocoding
            geocoding_dtos::GeocodeCenterDto,
            geocoding_dtos::ReverseGeocodeDto,
            ApiResponse<geocoding_dtos::GeocodeCenterDto>,
            ApiResponse<geocoding_dtos::ReverseGeocodeDto>,
            // Admin
            admin_dtos::AdminIssueDto,
            admin_dtos::UpdateStatusDto,
            admin_dtos::IssueSelectionDto,
            admin_dtos::BulkResultDto,
            admin_dtos::AdminUserDto,
            admin_dtos::BanUsersDto,
            admin_dtos::AdminSpamReportDto,
            admin_dtos::AdminStatsDto,
            admin_dtos::ChartDatasetDto,
            admin_dtos::TopReporterDto,
            admin_dtos::AnalyticsDto,
            ApiResponse<Vec<admin_dtos::AdminIssueDto>>,
            ApiResponse<admin_dtos::BulkResultDto>,
            ApiResponse<Vec<admin_dtos::AdminUserDto>>,
            ApiResponse<Vec<admin_dtos::AdminSpamReportDto>>,
            ApiResponse<admin_dtos::AdminStatsDto>,
            ApiResponse<admin_dtos::AnalyticsDto>,
        )
    ),
    tags(
        (name = "auth", description = "Current user"),
        (name = "profiles", description = "Citizen profiles"),
        (name = "issues", description = "Reporting, editing and flagging civic issues"),
        (name = "board", description = "Issue board sessions: list, filters, pagination and map"),
        (name = "geocoding", description = "Postal-code and address lookup"),
        (name = "admin", description = "Moderation dashboard (admin or moderator)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "CivicTrack API",
        version = "0.1.0",
        description = "API documentation for CivicTrack",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_feature() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/issues/{id}/spam-reports",
            "/api/board/sessions/{id}/map",
            "/api/geocode/reverse",
            "/api/admin/analytics",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_swagger_info_is_overridden() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Staging".to_string(),
            version: "9.9.9".to_string(),
            description: "staging build".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Staging");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
