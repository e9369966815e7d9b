//! Catalog loading and persisted collection state.

pub mod load;
pub mod persist;
pub mod schema;
pub mod store;

pub use load::*;
pub use persist::*;
pub use schema::*;
pub use store::*;
