//! Issue board: per-client sessions over one postal code's issues.
//!
//! A session holds the loaded issues, the active filter and page, the view
//! mode and the map marker layer. Sessions are anonymous; a bearer token
//! only matters for the `mine` filter and expires with the session.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/board/sessions` | Open a session |
//! | GET | `/api/board/sessions/{id}` | Grid view |
//! | DELETE | `/api/board/sessions/{id}` | Close the session |
//! | PUT | `/api/board/sessions/{id}/postal-code` | Load a postal code |
//! | PUT | `/api/board/sessions/{id}/filters` | Replace filters |
//! | PUT | `/api/board/sessions/{id}/page` | Change page |
//! | PUT | `/api/board/sessions/{id}/view` | Grid or map |
//! | GET | `/api/board/sessions/{id}/map` | Map markers |
//! | PUT | `/api/board/sessions/{id}/map` | Map radius and category |

pub mod dtos;
pub mod filter;
pub mod geo;
pub mod handlers;
pub mod map_sync;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod session;
pub mod source;
pub mod store;

pub use routes::routes;
pub use services::BoardService;
