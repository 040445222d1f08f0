use std::sync::{LockResult, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

/// Acquire a read guard, recovering the data if a writer panicked.
pub(crate) fn read_or_recover<'a, T>(
    lock: &'a RwLock<T>,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    recover(lock.read(), op, "read")
}

/// Acquire a write guard, recovering the data if a writer panicked.
pub(crate) fn write_or_recover<'a, T>(
    lock: &'a RwLock<T>,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    recover(lock.write(), op, "write")
}

fn recover<G>(result: LockResult<G>, op: &'static str, mode: &'static str) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(
            target: "folio::cache",
            op,
            mode,
            "recovered poisoned read-cache lock; cached entries may be stale"
        );
        poisoned.into_inner()
    })
}
