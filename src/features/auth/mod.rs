mod jwks;
mod validator;

pub mod dto;
pub mod guards;
pub mod handler;
pub mod model;
pub mod routes;
pub mod service;

pub use jwks::JwksClient;
pub use routes::routes;
pub use service::AuthService;
pub use validator::JwtValidator;
