mod profile;

pub use profile::{Profile, ProfileWithIssueCount};
