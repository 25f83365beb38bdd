//! Civic issues reported by citizens.
//!
//! Issue reads are public; writes need a profile that is not banned.
//! Photos are uploaded first and referenced by URL when the issue is created.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/issues` | Report an issue |
//! | POST | `/api/issues/photos` | Upload a photo batch |
//! | DELETE | `/api/issues/photos` | Remove an uploaded photo |
//! | GET | `/api/issues/{id}` | Issue detail with activity log |
//! | PATCH | `/api/issues/{id}` | Edit your issue |
//! | DELETE | `/api/issues/{id}` | Delete your issue |
//! | POST | `/api/issues/{id}/spam-reports` | Flag an issue as spam |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::{IssueService, PhotoService};
