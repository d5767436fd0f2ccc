pub mod config_store;
pub mod observability;

pub use config_store::*;
pub use observability::*;
