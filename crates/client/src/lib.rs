pub mod config;
pub mod remote;
pub mod session;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod fake;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use remote::{HttpRemote, RemoteClient, RemoteError};
pub use store::{StoreError, StoreSnapshot, WorkspaceStore};
pub use sync::{EditSink, EditWindows, PageEditor};

/// Lock a std mutex, recovering the guard if a panicking holder poisoned
/// it. Store state stays consistent across panics because every mutation
/// is a single assignment or retain under the guard.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
