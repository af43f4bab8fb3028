//! Bearer token authentication.
//!
//! Credentials are issued by an external identity provider; this feature only
//! validates access tokens and exposes the caller as [`model::AuthenticatedUser`].

mod validator;

pub mod guards;
pub mod model;

pub use validator::JwtValidator;

#[cfg(test)]
pub use validator::tests as test_tokens;
