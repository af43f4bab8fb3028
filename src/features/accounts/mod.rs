//! Local accounts and user profiles.
//!
//! Identities are issued by the external identity provider; a local `users`
//! row is mirrored from the validated token the first time a user writes
//! anything, and profiles are created lazily.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/me/profile` | Yes | Own profile with listing stats |
//! | PATCH | `/api/me/profile` | Yes | Update phone, city, bio, avatar |
//! | GET | `/api/users/{username}` | No | Public profile with latest listings |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{ensure_user, AccountService};
