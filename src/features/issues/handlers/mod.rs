mod issue_handler;
mod photo_handler;

pub use issue_handler::*;
pub use photo_handler::*;
