mod category_service;
mod category_tree;

pub use category_service::CategoryService;
pub use category_tree::CategoryTree;
