//! Backend of a configuration editor that maps each monitored application
//! to the field identifying its records.
//!
//! Two components carry the design: [`MetadataCache`], a single-flight
//! memoizing cache over the slow remote metadata lookups, and
//! [`OptionSynchronizer`], which keeps each configuration row's selectable
//! field options consistent with user edits while resisting out-of-order
//! completion of the underlying fetches. [`ConfigService`] translates
//! between the persisted configuration shape and the in-memory document.
//!
//! The visual form renderer, the host platform's persistence endpoint and
//! the metadata provider itself are external collaborators reached through
//! the ports in [`keyfield_domain::repositories`].

pub use keyfield_application::{
    derive_primary_key_options, ConfigService, MetadataCache, OptionSynchronizer,
};
pub use keyfield_domain::{
    AppId, AppSummary, ConfigRepository, ConfigurationDocument, ConfigurationRow,
    FieldCode, FieldDescriptor, FieldMap, FieldType, Layout, MetadataKey,
    MetadataProvider, OptionEntry, RowOptions,
};
pub use keyfield_errors::{KeyfieldError, KeyfieldResult};
pub use keyfield_infrastructure::{init_observability, FileConfigRepository};
