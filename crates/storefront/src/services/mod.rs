//! Business logic between the route handlers and the repositories.
//!
//! - `auth` - Signup, login and password hashing
//! - `cache` - Cached category and area lists
//! - `checkout` - Cart quotes and transactional order placement

pub mod auth;
pub mod cache;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use cache::CatalogCache;
pub use checkout::{CheckoutError, CheckoutService};
