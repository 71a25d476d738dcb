// Adapters layer: concrete implementations for external systems (fleet API, local storage).

pub mod http;
pub mod storage;

pub use http::{HttpInventoryClient, StaticToken};
pub use storage::LocalStorage;
