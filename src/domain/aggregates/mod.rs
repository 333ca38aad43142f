//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{MedusaProduct, Nutrition, Product};
pub use order::{Address, Customer, LineItem, Order, OrderError, OrderMetadata};
pub use cart::{CartError, CartLine, CheckoutCart};
