pub mod config_service;
pub mod metadata_cache;
pub mod option_synchronizer;
pub(crate) mod row_diff;
pub(crate) mod single_flight;

pub use config_service::*;
pub use metadata_cache::*;
pub use option_synchronizer::*;
