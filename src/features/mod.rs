pub mod admin;
pub mod auth;
pub mod board;
pub mod geocoding;
pub mod issues;
pub mod profiles;
