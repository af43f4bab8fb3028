//! Classified listings: search, detail pages and seller management.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/listings` | Optional | Search active listings |
//! | GET | `/api/listings/{slug}` | Optional | Listing detail; counts a view |
//! | GET | `/api/home` | Optional | Recent, featured, top categories |
//! | POST | `/api/listings` | Yes | Create listing |
//! | PATCH | `/api/listings/{slug}` | Owner | Update listing |
//! | DELETE | `/api/listings/{slug}` | Owner | Delete listing |
//! | GET | `/api/me/listings` | Yes | Caller's listings, any status |
//!
//! With a token, list results carry `is_favorited` for the caller.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ListingService;
