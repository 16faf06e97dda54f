/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - full access, including user-level operations
pub const ROLE_ADMIN: &str = "admin";

/// Editor role - can manage tour content and images
pub const ROLE_EDITOR: &str = "editor";

// =============================================================================
// CONTENT LIMITS
// =============================================================================

/// Rating bounds for destinations (inclusive)
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;
