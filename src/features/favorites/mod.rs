//! Favorites: a user's saved listings.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/favorites/toggle` | Add or remove a listing (form body `listing_id`) |
//! | GET | `/api/favorites` | Caller's favorites, newest first |
//! | DELETE | `/api/favorites/{id}` | Remove one favorite |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::FavoriteService;
