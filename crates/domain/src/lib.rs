pub mod entities;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use keyfield_errors::{KeyfieldError, KeyfieldResult};
pub use repositories::*;
pub use value_objects::*;
