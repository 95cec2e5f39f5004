//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the internal row types
//! in `db`. Most derive `Serialize` and go straight into JSON responses.

pub mod address;
pub mod order;
pub mod person;
pub mod product;
pub mod session;

pub use address::{Area, AttachedAddress, SavedAddress};
pub use order::{NewOrder, Order, OrderLine, OrderSummary, Payment};
pub use person::{AuthenticatedPerson, NewPerson, Person, PersonAddressInput};
pub use product::{
    Category, NewProduct, OrderableProduct, Product, ProductUpdate, SellerProduct, SellerStats,
};
pub use session::{CurrentUser, keys as session_keys};
