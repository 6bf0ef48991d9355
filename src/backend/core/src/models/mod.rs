//! Domain entities.
//!
//! Account entities live in [`accounts`], marketplace resources in
//! [`resources`]. Entities only derive `Serialize`: inbound payloads use
//! dedicated request structs in the API layer, so password hashes and other
//! internal fields never round-trip through client JSON.

pub mod accounts;
pub mod resources;
pub mod validate;

pub use accounts::{Admin, Customer, Deliverer, Seller};
pub use resources::{
    Delivery, DeliveryStatus, Order, OrderStatus, Payment, PaymentMethod, Product, Review,
};
