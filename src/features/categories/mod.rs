//! Listing categories.
//!
//! Categories form a self-referencing tree. Search filters resolve a category
//! reference (slug or numeric id) into the ids of its whole active subtree.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/categories` | No | Active categories, flat or `?tree=true` |
//! | GET | `/api/categories/{slug}` | No | Category by slug |
//! | POST | `/api/admin/categories` | Admin | Create category |
//! | PATCH | `/api/admin/categories/{id}` | Admin | Update category / move in tree |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
