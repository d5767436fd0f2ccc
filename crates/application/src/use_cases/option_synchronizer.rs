//! Keeps each row's selectable primary-key options in step with the
//! document as the user edits it.

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tracing::{debug, error};

use keyfield_domain::{
    AppId, ConfigurationDocument, ConfigurationRow, FieldMap, OptionEntry, RowOptions,
};

use crate::use_cases::metadata_cache::MetadataCache;
use crate::use_cases::row_diff::{plan_row_updates, RowPlan};

/// Builds the selectable option list for one row from its application's
/// field map: the fields eligible as a primary key, as `{value: code,
/// label: label}` entries, behind one leading empty "not selected" entry.
///
/// The field map is ordered by code, so the list is deterministic.
pub fn derive_primary_key_options(fields: &FieldMap) -> Vec<OptionEntry> {
    let mut options = vec![OptionEntry::empty()];
    options.extend(
        fields
            .values()
            .filter(|field| field.is_primary_key_candidate())
            .map(OptionEntry::from_field),
    );
    options
}

/// One scheduled fetch, tagged with the slot it was issued for.
///
/// The sequence number is the staleness guard: the result is applied only
/// if the slot still carries the same number when the fetch completes.
/// There is no cancellation primitive; an overtaken fetch simply completes
/// and is discarded.
#[derive(Debug, Clone, Copy)]
struct FetchTicket {
    index: usize,
    seq: u64,
    app_id: Option<AppId>,
}

#[derive(Default)]
struct SyncState {
    /// The document snapshot the options below correspond to.
    rows: Vec<ConfigurationRow>,
    /// One derived-option list per row, index-aligned with `rows` at every
    /// observable point. A slot awaiting its fetch holds an empty list.
    options: Vec<RowOptions>,
    /// Edit sequence number of each slot.
    seqs: Vec<u64>,
    /// Monotonic ticket source.
    next_seq: u64,
}

/// Maintains the per-row derived option lists of the configuration editor.
///
/// Every edit recomputes only the slots whose application changed; the
/// rest carry their options over untouched. Fetch results arriving after
/// the slot was edited again are discarded, so the visible state always
/// reflects the most recently issued edit per row, not the most recently
/// completed fetch.
pub struct OptionSynchronizer {
    cache: Arc<MetadataCache>,
    state: Mutex<SyncState>,
}

impl OptionSynchronizer {
    pub fn new(cache: Arc<MetadataCache>) -> Self {
        Self {
            cache,
            state: Mutex::new(SyncState::default()),
        }
    }

    /// Computes the derived options of a freshly loaded document, fetching
    /// every row's fields concurrently (deduplication across rows with the
    /// same application happens in the cache, not here). Discards any
    /// previous synchronizer state. Returns once every fetch has settled.
    pub async fn initialize(&self, document: &ConfigurationDocument) -> Vec<RowOptions> {
        let tickets: Vec<FetchTicket> = {
            let mut state = self.state.lock().expect("synchronizer state lock poisoned");
            state.rows = document.rows.clone();
            state.options = vec![RowOptions::default(); document.rows.len()];
            state.seqs.clear();
            document
                .rows
                .iter()
                .enumerate()
                .map(|(index, row)| {
                    state.next_seq += 1;
                    let seq = state.next_seq;
                    state.seqs.push(seq);
                    FetchTicket {
                        index,
                        seq,
                        app_id: row.app_id,
                    }
                })
                .collect()
        };

        self.run_fetches(tickets).await;
        self.current_options()
    }

    /// Recomputes the derived options after a user edit.
    ///
    /// Slots whose application is unchanged keep their previous option
    /// list (the same allocation, no refetch). Slots whose application
    /// changed are emptied immediately (the old application's fields must
    /// never remain visible) and refilled when their fetch completes,
    /// unless a newer edit overtakes it first. The options list keeps the
    /// length and index order of the new document throughout.
    pub async fn on_rows_changed(&self, document: &ConfigurationDocument) -> Vec<RowOptions> {
        let tickets: Vec<FetchTicket> = {
            let mut state = self.state.lock().expect("synchronizer state lock poisoned");
            let plans = plan_row_updates(&state.rows, &document.rows);

            let mut options = Vec::with_capacity(document.rows.len());
            let mut seqs = Vec::with_capacity(document.rows.len());
            let mut tickets = Vec::new();
            for plan in plans {
                match plan {
                    RowPlan::Reuse { index } => {
                        options.push(Arc::clone(&state.options[index]));
                        // Keeping the sequence number lets a still-pending
                        // fetch for this slot land.
                        seqs.push(state.seqs[index]);
                    }
                    RowPlan::Refetch { index, app_id } => {
                        state.next_seq += 1;
                        options.push(RowOptions::default());
                        seqs.push(state.next_seq);
                        tickets.push(FetchTicket {
                            index,
                            seq: state.next_seq,
                            app_id,
                        });
                    }
                }
            }
            state.rows = document.rows.clone();
            state.options = options;
            state.seqs = seqs;
            tickets
        };

        self.run_fetches(tickets).await;
        self.current_options()
    }

    /// Snapshot of the derived options, index-aligned with the most
    /// recently submitted document.
    pub fn current_options(&self) -> Vec<RowOptions> {
        self.state
            .lock()
            .expect("synchronizer state lock poisoned")
            .options
            .clone()
    }

    async fn run_fetches(&self, tickets: Vec<FetchTicket>) {
        if tickets.is_empty() {
            return;
        }
        join_all(tickets.into_iter().map(|ticket| self.fetch_slot(ticket))).await;
    }

    async fn fetch_slot(&self, ticket: FetchTicket) {
        let result = self.cache.get_fields(ticket.app_id).await;

        let mut state = self.state.lock().expect("synchronizer state lock poisoned");
        if state.seqs.get(ticket.index) != Some(&ticket.seq) {
            debug!(
                index = ticket.index,
                seq = ticket.seq,
                "discarding stale fetch result"
            );
            return;
        }
        match result {
            Ok(fields) => {
                state.options[ticket.index] = Arc::new(derive_primary_key_options(&fields));
            }
            Err(error) => {
                // The slot stays empty; the user retries by re-selecting
                // the application.
                error!(index = ticket.index, %error, "field fetch failed, row options unavailable");
            }
        }
    }
}
