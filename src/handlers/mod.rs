pub mod auth;
pub mod categories;
pub mod common;
pub mod health;
pub mod products;
pub mod suppliers;
pub mod transactions;
pub mod users;

pub use crate::AppState;
