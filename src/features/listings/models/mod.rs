mod listing;
mod listing_image;

pub use listing::*;
pub use listing_image::*;
