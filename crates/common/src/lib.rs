pub mod types;

pub use types::{BookId, OrderId, UserId};
