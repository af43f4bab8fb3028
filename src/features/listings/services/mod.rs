mod listing_query;
mod listing_service;

pub use listing_query::{escape_like, ListingFilters, ListingSort};
pub use listing_service::ListingService;
