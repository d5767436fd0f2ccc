//! Pure comparison of two row sequences.
//!
//! Separated from the fetch orchestration so the reuse/refetch rules are
//! testable without any asynchrony.

use keyfield_domain::{AppId, ConfigurationRow};

/// What to do with one slot of the derived-options list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowPlan {
    /// The application at this index is unchanged; carry the previous
    /// options over untouched.
    Reuse { index: usize },
    /// The application at this index changed, or the row is new; the slot
    /// needs a fresh fetch.
    Refetch { index: usize, app_id: Option<AppId> },
}

/// Plans the per-slot update from `previous` to `next`, one entry per row
/// of `next`, in index order. Rows past the end of `next` are dropped by
/// omission.
///
/// The comparison is positional: only the application id matters (derived
/// options do not depend on the chosen primary key field), and a row shifted
/// by an insertion or deletion counts as changed whenever the application at
/// its index differs.
pub(crate) fn plan_row_updates(
    previous: &[ConfigurationRow],
    next: &[ConfigurationRow],
) -> Vec<RowPlan> {
    next.iter()
        .enumerate()
        .map(|(index, row)| match previous.get(index) {
            Some(prev) if prev.app_id == row.app_id => RowPlan::Reuse { index },
            _ => RowPlan::Refetch {
                index,
                app_id: row.app_id,
            },
        })
        .collect()
}
