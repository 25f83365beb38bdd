mod admin_service;
mod analytics_service;

pub use admin_service::AdminService;
pub use analytics_service::AnalyticsService;
