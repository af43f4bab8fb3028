mod category;

pub use category::{Category, CATEGORY_COLUMNS};
