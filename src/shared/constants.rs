/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Characters of the description shown on an issue card
pub const CARD_EXCERPT_CHARS: usize = 100;

/// Display name used whenever the reporter must not be revealed
pub const ANONYMOUS_REPORTER: &str = "Anonymous";

// =============================================================================
// NOTICES
// =============================================================================

/// Auto-dismiss delay for notices on citizen endpoints
pub const DEFAULT_NOTICE_DISMISS_MS: u64 = 3000;

/// Auto-dismiss delay for notices on admin endpoints
pub const ADMIN_NOTICE_DISMISS_MS: u64 = 5000;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - full moderation plus user bans
pub const ROLE_ADMIN: &str = "admin";

/// Moderator role - can triage, approve and delete issues
pub const ROLE_MODERATOR: &str = "moderator";

/// Citizen role - can report and track issues
#[cfg(test)]
pub const ROLE_USER: &str = "user";
