mod issue_service;
mod photo_service;

pub(crate) use issue_service::ISSUE_SELECT;
pub use issue_service::IssueService;
pub use photo_service::{PhotoService, PhotoUpload};
