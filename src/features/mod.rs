pub mod accounts;
pub mod auth;
pub mod categories;
pub mod favorites;
pub mod listings;
