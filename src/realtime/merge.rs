//! Snapshot/delta merge.

use crate::domain::{ShutdownPatch, Snapshot};

/// Fold a shutdown patch into a snapshot.
///
/// Returns a new snapshot equal to `base` except that `base.shutdown` is
/// overwritten field by field with the fields present in `patch`. `base` is
/// left untouched, so holders of the previous value keep a stable view.
#[must_use]
pub fn merge(base: &Snapshot, patch: &ShutdownPatch) -> Snapshot {
    let mut next = base.clone();
    patch.apply_to(&mut next.shutdown);
    next
}
