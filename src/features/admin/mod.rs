//! Moderation dashboard for admins and moderators.
//!
//! Every route requires the `admin` or `moderator` role; banning users
//! requires `admin`. Routes are nested under `/api/admin`.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/issues` | All issues, hidden included |
//! | GET | `/issues/moderation` | Issues marked spam or invalid |
//! | GET | `/issues/{id}` | Issue detail |
//! | PATCH | `/issues/{id}/status` | Set status |
//! | POST | `/issues/approve` | Bulk approve |
//! | POST | `/issues/bulk-delete` | Bulk delete |
//! | DELETE | `/issues/{id}` | Delete an issue |
//! | GET | `/users` | Profiles with issue counts |
//! | POST | `/users/ban` | Bulk ban or unban (admin only) |
//! | GET | `/spam-reports` | Spam reports |
//! | DELETE | `/spam-reports/{id}` | Dismiss a spam report |
//! | GET | `/stats` | Dashboard counters |
//! | GET | `/analytics` | Chart datasets |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::AdminService;
