//! Shared testing utilities for the keyfield workspace.
//!
//! Hand-written mock implementations of the external ports, plus builders
//! for test data. Add as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! keyfield-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod mocks;

pub use builders::*;
pub use mocks::*;
