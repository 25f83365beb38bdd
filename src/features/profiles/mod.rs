//! Citizen profiles.
//!
//! A profile is created once after sign-up with the identity provider and
//! keyed by the token subject. Banned profiles cannot report issues.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/profiles` | Create the caller's profile |
//! | GET | `/api/profiles/me` | Get the caller's profile |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::ProfileService;
