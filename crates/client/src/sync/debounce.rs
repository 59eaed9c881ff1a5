// One debounce channel: keeps the latest value and a single armed timer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{EditSink, EditTarget};
use crate::lock;
use crate::store::StoreError;

pub(crate) struct DebouncedWrite {
    target: EditTarget,
    window: Duration,
    pending: Arc<Mutex<Option<String>>>,
    timer: Option<JoinHandle<()>>,
}

impl DebouncedWrite {
    pub(crate) fn new(target: EditTarget, window: Duration) -> Self {
        Self { target, window, pending: Arc::new(Mutex::new(None)), timer: None }
    }

    pub(crate) fn pending(&self) -> Option<String> {
        lock(&self.pending).clone()
    }

    /// Replace the pending value and restart the quiet window.
    pub(crate) fn push<S: EditSink>(&mut self, sink: &Arc<S>, page_id: Uuid, value: String) {
        *lock(&self.pending) = Some(value);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let pending = Arc::clone(&self.pending);
        let sink = Arc::clone(sink);
        let (target, window) = (self.target, self.window);
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let Some(value) = lock(&pending).take() else {
                return;
            };
            // The write outlives this timer: a later edit aborts the timer,
            // never a request already on the wire.
            tokio::spawn(async move {
                if let Err(error) = deliver(sink.as_ref(), target, page_id, value).await {
                    warn!(%page_id, target = target.as_str(), %error, "debounced write failed");
                }
            });
        }));
    }

    /// Disarm the timer and write the pending value now, if any.
    pub(crate) async fn flush<S: EditSink>(
        &mut self,
        sink: &S,
        page_id: Uuid,
    ) -> Result<(), StoreError> {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let Some(value) = lock(&self.pending).take() else {
            return Ok(());
        };
        deliver(sink, self.target, page_id, value).await
    }
}

async fn deliver<S: EditSink>(
    sink: &S,
    target: EditTarget,
    page_id: Uuid,
    value: String,
) -> Result<(), StoreError> {
    debug!(%page_id, target = target.as_str(), bytes = value.len(), "writing edit");
    match target {
        EditTarget::Title => sink.write_title(page_id, value).await,
        EditTarget::Content => sink.write_content(page_id, value).await,
    }
}
