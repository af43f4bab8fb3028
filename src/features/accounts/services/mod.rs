mod account_service;
mod local_user;

pub use account_service::AccountService;
pub use local_user::ensure_user;
