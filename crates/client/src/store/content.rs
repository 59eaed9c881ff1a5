// Per-page serialization of editor content saves.
//
// Saving content is fetch-then-upsert; two overlapping saves for a page
// with no `editor_content` block would both create one. Each page gets a
// gate: one save runs at a time, waiters queue in arrival order, and a
// waiter that is no longer the newest save for its page is superseded and
// skips its write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::MutexGuard;
use uuid::Uuid;

use crate::lock;

#[derive(Debug, Default)]
struct ContentGate {
    turn: tokio::sync::Mutex<()>,
    latest: AtomicU64,
}

/// Gates keyed by page id. Entries are dropped once no save holds them.
#[derive(Debug, Default)]
pub(crate) struct ContentGates {
    gates: Mutex<HashMap<Uuid, Arc<ContentGate>>>,
}

impl ContentGates {
    /// Register a save for `page_id`. The returned ticket must be held for
    /// the whole save.
    pub(crate) fn enter(&self, page_id: Uuid) -> ContentTicket<'_> {
        let gate = Arc::clone(lock(&self.gates).entry(page_id).or_default());
        let number = gate.latest.fetch_add(1, Ordering::SeqCst) + 1;
        ContentTicket { gates: self, page_id, gate, number }
    }

    pub(crate) fn active(&self) -> usize {
        lock(&self.gates).len()
    }

    fn release(&self, page_id: Uuid, gate: &Arc<ContentGate>) {
        let mut gates = lock(&self.gates);
        // Map entry + the releasing ticket: nobody else is saving this page.
        if Arc::strong_count(gate) == 2 {
            gates.remove(&page_id);
        }
    }
}

pub(crate) struct ContentTicket<'a> {
    gates: &'a ContentGates,
    page_id: Uuid,
    gate: Arc<ContentGate>,
    number: u64,
}

impl ContentTicket<'_> {
    /// Wait until no other save for this page is in flight.
    pub(crate) async fn turn(&self) -> MutexGuard<'_, ()> {
        self.gate.turn.lock().await
    }

    /// A newer save for the same page has been registered since this one.
    pub(crate) fn is_superseded(&self) -> bool {
        self.gate.latest.load(Ordering::SeqCst) != self.number
    }
}

impl Drop for ContentTicket<'_> {
    fn drop(&mut self) {
        self.gates.release(self.page_id, &self.gate);
    }
}
