//! Ports to the external collaborators.
//!
//! Abstract interfaces for the remote metadata provider and the
//! configuration persistence endpoint, following dependency inversion:
//! concrete adapters live in the infrastructure crate, test doubles in
//! testing-utils.

use async_trait::async_trait;

use crate::entities::{AppId, AppSummary, FieldMap, Layout};
use keyfield_errors::KeyfieldResult;

/// Remote metadata lookups. Every call crosses the network and is slow;
/// callers go through the metadata cache instead of hitting this directly.
///
/// The port takes a concrete [`AppId`]: the "no application selected" empty
/// case is short-circuited above it and never reaches the provider.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_apps(&self) -> KeyfieldResult<Vec<AppSummary>>;
    async fn fetch_fields(&self, app_id: AppId) -> KeyfieldResult<FieldMap>;
    async fn fetch_form_layout(&self, app_id: AppId) -> KeyfieldResult<Layout>;
}

/// Persistence of the serialized configuration document.
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// The raw serialized configuration, or `None` when nothing has been
    /// persisted yet.
    async fn load(&self) -> KeyfieldResult<Option<String>>;
    async fn save(&self, raw: &str) -> KeyfieldResult<()>;
}
