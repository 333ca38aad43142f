//! Storefront domain: value objects, backend aggregates, payment events and
//! the delivery/locality services.
pub mod aggregates;
pub mod events;
pub mod services;
pub mod value_objects;
