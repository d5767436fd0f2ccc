//! Session-wide cache over the remote metadata provider.

use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, instrument};

use keyfield_domain::{
    AppId, AppSummary, FieldMap, Layout, MetadataKey, MetadataProvider,
};
use keyfield_errors::KeyfieldResult;

use crate::use_cases::single_flight::SingleFlightMap;

/// Memoizing cache in front of a slow remote metadata provider.
///
/// One instance lives for the whole editing session and is passed by
/// reference to its collaborators; entries are never evicted (the remote
/// metadata is assumed immutable for the session). Every lookup is
/// single-flight: concurrent requests for the same key share one provider
/// call, which happens naturally when the editor re-renders and re-requests
/// a row's fields while the first fetch is still outstanding.
pub struct MetadataCache {
    provider: Arc<dyn MetadataProvider>,
    apps: SingleFlightMap<MetadataKey, Arc<Vec<AppSummary>>>,
    fields: SingleFlightMap<MetadataKey, Arc<FieldMap>>,
    layouts: SingleFlightMap<MetadataKey, Arc<Layout>>,
}

impl MetadataCache {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            apps: SingleFlightMap::new(),
            fields: SingleFlightMap::new(),
            layouts: SingleFlightMap::new(),
        }
    }

    /// The list of monitored applications. Fetched from the provider
    /// exactly once per session, no matter how many callers ask before the
    /// first fetch resolves.
    #[instrument(skip(self))]
    pub async fn get_apps(&self) -> KeyfieldResult<Arc<Vec<AppSummary>>> {
        let provider = Arc::clone(&self.provider);
        self.apps
            .get_or_fetch(MetadataKey::Apps, move || {
                async move {
                    match provider.fetch_apps().await {
                        Ok(apps) => Ok(Arc::new(apps)),
                        Err(error) => {
                            error!(key = %MetadataKey::Apps, %error, "metadata fetch failed");
                            Err(error)
                        }
                    }
                }
                .boxed()
            })
            .await
    }

    /// The field map of one application. `None` is the "no application
    /// selected" case: it resolves to an empty map immediately and never
    /// consults the provider.
    #[instrument(skip(self))]
    pub async fn get_fields(&self, app_id: Option<AppId>) -> KeyfieldResult<Arc<FieldMap>> {
        let Some(app_id) = app_id else {
            debug!("field lookup without application id, returning empty map");
            return Ok(Arc::new(FieldMap::new()));
        };
        let key = MetadataKey::Fields(app_id);
        let provider = Arc::clone(&self.provider);
        self.fields
            .get_or_fetch(key, move || {
                async move {
                    match provider.fetch_fields(app_id).await {
                        Ok(fields) => Ok(Arc::new(fields)),
                        Err(error) => {
                            error!(%key, %error, "metadata fetch failed");
                            Err(error)
                        }
                    }
                }
                .boxed()
            })
            .await
    }

    /// The form layout of one application, passed through unmodified. Same
    /// contract as [`get_fields`](Self::get_fields).
    #[instrument(skip(self))]
    pub async fn get_form_layout(&self, app_id: Option<AppId>) -> KeyfieldResult<Arc<Layout>> {
        let Some(app_id) = app_id else {
            debug!("layout lookup without application id, returning empty layout");
            return Ok(Arc::new(Layout::Object(Default::default())));
        };
        let key = MetadataKey::Layout(app_id);
        let provider = Arc::clone(&self.provider);
        self.layouts
            .get_or_fetch(key, move || {
                async move {
                    match provider.fetch_form_layout(app_id).await {
                        Ok(layout) => Ok(Arc::new(layout)),
                        Err(error) => {
                            error!(%key, %error, "metadata fetch failed");
                            Err(error)
                        }
                    }
                }
                .boxed()
            })
            .await
    }
}
