//! Mock implementations of the external ports.
//!
//! In-memory test doubles for the metadata provider and the configuration
//! store. The provider mock counts calls (for single-flight and reuse
//! assertions), injects failures per application, and can hold a lookup
//! open behind a gate so tests control completion order.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use keyfield_domain::entities::{AppId, AppSummary, FieldMap, Layout};
use keyfield_domain::repositories::{ConfigRepository, MetadataProvider};
use keyfield_errors::{KeyfieldError, KeyfieldResult};

/// Mock implementation of MetadataProvider for testing
#[derive(Default)]
pub struct MockMetadataProvider {
    apps: Mutex<Vec<AppSummary>>,
    fields: Mutex<HashMap<AppId, FieldMap>>,
    layouts: Mutex<HashMap<AppId, Layout>>,
    field_gates: Mutex<HashMap<AppId, Arc<Semaphore>>>,
    failing_fields: Mutex<HashSet<AppId>>,
    apps_failing: AtomicBool,
    apps_fetches: AtomicUsize,
    field_fetches: Mutex<Vec<AppId>>,
    layout_fetches: Mutex<Vec<AppId>>,
}

impl MockMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an application with its field map.
    pub fn add_app(&self, id: AppId, name: &str, fields: FieldMap) {
        self.apps.lock().unwrap().push(AppSummary::new(id, name));
        self.fields.lock().unwrap().insert(id, fields);
    }

    pub fn set_layout(&self, id: AppId, layout: Layout) {
        self.layouts.lock().unwrap().insert(id, layout);
    }

    /// Makes every `fetch_apps` call fail until cleared.
    pub fn set_apps_failure(&self, fail: bool) {
        self.apps_failing.store(fail, Ordering::SeqCst);
    }

    /// Makes `fetch_fields` fail for one application until cleared.
    pub fn fail_fields_for(&self, id: AppId) {
        self.failing_fields.lock().unwrap().insert(id);
    }

    pub fn clear_fields_failure(&self, id: AppId) {
        self.failing_fields.lock().unwrap().remove(&id);
    }

    /// Holds every subsequent `fetch_fields` call for `id` open until the
    /// returned gate receives a permit per waiting call.
    pub fn hold_fields(&self, id: AppId) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.field_gates.lock().unwrap().insert(id, gate.clone());
        gate
    }

    /// Number of times `fetch_apps` reached the provider.
    pub fn apps_fetch_count(&self) -> usize {
        self.apps_fetches.load(Ordering::SeqCst)
    }

    /// Applications `fetch_fields` was called for, in call order.
    pub fn field_fetch_log(&self) -> Vec<AppId> {
        self.field_fetches.lock().unwrap().clone()
    }

    pub fn field_fetch_count(&self, id: AppId) -> usize {
        self.field_fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|fetched| **fetched == id)
            .count()
    }

    pub fn layout_fetch_log(&self) -> Vec<AppId> {
        self.layout_fetches.lock().unwrap().clone()
    }

    async fn wait_for_gate(&self, id: AppId) -> KeyfieldResult<()> {
        let gate = self.field_gates.lock().unwrap().get(&id).cloned();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| KeyfieldError::internal("mock gate closed"))?;
            permit.forget();
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataProvider for MockMetadataProvider {
    async fn fetch_apps(&self) -> KeyfieldResult<Vec<AppSummary>> {
        self.apps_fetches.fetch_add(1, Ordering::SeqCst);
        if self.apps_failing.load(Ordering::SeqCst) {
            return Err(KeyfieldError::provider_unavailable(
                "mock application list failure",
            ));
        }
        Ok(self.apps.lock().unwrap().clone())
    }

    async fn fetch_fields(&self, app_id: AppId) -> KeyfieldResult<FieldMap> {
        self.field_fetches.lock().unwrap().push(app_id);
        self.wait_for_gate(app_id).await?;
        if self.failing_fields.lock().unwrap().contains(&app_id) {
            return Err(KeyfieldError::provider_unavailable(format!(
                "mock field failure for app {app_id}"
            )));
        }
        self.fields
            .lock()
            .unwrap()
            .get(&app_id)
            .cloned()
            .ok_or_else(|| {
                KeyfieldError::provider_unavailable(format!("unknown app {app_id}"))
            })
    }

    async fn fetch_form_layout(&self, app_id: AppId) -> KeyfieldResult<Layout> {
        self.layout_fetches.lock().unwrap().push(app_id);
        self.layouts
            .lock()
            .unwrap()
            .get(&app_id)
            .cloned()
            .ok_or_else(|| {
                KeyfieldError::provider_unavailable(format!("no layout for app {app_id}"))
            })
    }
}

/// Mock implementation of ConfigRepository for testing
#[derive(Default)]
pub struct MockConfigRepository {
    stored: Mutex<Option<String>>,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
    saves: Mutex<Vec<String>>,
}

impl MockConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository that already holds a persisted configuration.
    pub fn with_stored(raw: &str) -> Self {
        Self {
            stored: Mutex::new(Some(raw.to_string())),
            ..Self::default()
        }
    }

    pub fn set_load_failure(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn set_save_failure(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    /// The currently stored raw configuration, if any.
    pub fn stored(&self) -> Option<String> {
        self.stored.lock().unwrap().clone()
    }

    /// Every raw payload passed to `save`, in call order.
    pub fn save_history(&self) -> Vec<String> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfigRepository for MockConfigRepository {
    async fn load(&self) -> KeyfieldResult<Option<String>> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(KeyfieldError::config_store("mock load failure"));
        }
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, raw: &str) -> KeyfieldResult<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(KeyfieldError::config_store("mock save failure"));
        }
        self.saves.lock().unwrap().push(raw.to_string());
        *self.stored.lock().unwrap() = Some(raw.to_string());
        Ok(())
    }
}
