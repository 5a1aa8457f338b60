//! Domain layer for the bookstore backend.
//!
//! This crate provides the core domain model:
//! - Catalog entities (`Book`, `Inventory`)
//! - Registered users (`User`, `Role`)
//! - `Money` for minor-unit currency arithmetic
//! - The `Order` aggregate with its line items, builder, and status machine

pub mod book;
pub mod money;
pub mod order;
pub mod user;

pub use book::{Book, Inventory};
pub use money::Money;
pub use order::{LineItem, Order, OrderBuilder, OrderError, OrderStatus};
pub use user::{Role, User};
