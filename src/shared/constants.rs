// =============================================================================
// PAGE SIZES
// =============================================================================

/// Listing search results per page
pub const SEARCH_PAGE_SIZE: i64 = 12;

/// Favorites per page
pub const FAVORITES_PAGE_SIZE: i64 = 12;

/// Owner's own listings per page
pub const MY_LISTINGS_PAGE_SIZE: i64 = 10;

/// Listings previewed on a public profile
pub const PROFILE_PREVIEW_SIZE: i64 = 6;

// =============================================================================
// HOME / DETAIL LIMITS
// =============================================================================

pub const HOME_RECENT_LIMIT: i64 = 8;
pub const HOME_FEATURED_LIMIT: i64 = 4;
pub const HOME_TOP_CATEGORIES: usize = 12;

/// Similar listings shown on a detail page
pub const SIMILAR_LISTINGS_LIMIT: i64 = 4;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Marketplace administrator - manages the category tree
pub const ROLE_ADMIN: &str = "admin";
