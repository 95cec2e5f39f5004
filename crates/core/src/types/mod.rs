//! Core types for the grocery storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use role::{Role, RoleError};
pub use status::*;
