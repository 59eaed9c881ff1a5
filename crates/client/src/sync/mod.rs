// Content sync buffer.
//
// Coalesces rapid edits of one page into at most one remote write per
// channel per quiet window. Title and content are independent channels with
// their own windows; nothing orders a title write against a content write.
//
// Writes fired by a timer are logged on failure and never retried. Dropping
// a `PageEditor` detaches its armed timers, so edits made just before a page
// is closed still reach the server. Call `flush` to write them right away.

mod debounce;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use folio_common::types::PageUpdate;

use crate::config::SyncConfig;
use crate::remote::RemoteClient;
use crate::store::{StoreError, WorkspaceStore};

use self::debounce::DebouncedWrite;

/// Destination of debounced edits.
pub trait EditSink: Send + Sync + 'static {
    fn write_title(
        &self,
        page_id: Uuid,
        title: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn write_content(
        &self,
        page_id: Uuid,
        html: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<R: RemoteClient> EditSink for WorkspaceStore<R> {
    async fn write_title(&self, page_id: Uuid, title: String) -> Result<(), StoreError> {
        self.update_page(page_id, &PageUpdate::title(title)).await
    }

    async fn write_content(&self, page_id: Uuid, html: String) -> Result<(), StoreError> {
        self.save_page_content(page_id, &html).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditTarget {
    Title,
    Content,
}

impl EditTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
        }
    }
}

/// Quiet windows per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditWindows {
    pub title: Duration,
    pub content: Duration,
}

impl Default for EditWindows {
    fn default() -> Self {
        Self { title: Duration::from_millis(1_000), content: Duration::from_millis(2_000) }
    }
}

impl From<&SyncConfig> for EditWindows {
    fn from(config: &SyncConfig) -> Self {
        Self { title: config.title_window(), content: config.content_window() }
    }
}

/// Editing session for one page.
///
/// `set_*` must be called from within a tokio runtime; each call arms a
/// timer task for its channel.
pub struct PageEditor<S: EditSink> {
    page_id: Uuid,
    sink: Arc<S>,
    title: DebouncedWrite,
    content: DebouncedWrite,
}

impl<S: EditSink> PageEditor<S> {
    pub fn new(sink: Arc<S>, page_id: Uuid, windows: EditWindows) -> Self {
        Self {
            page_id,
            sink,
            title: DebouncedWrite::new(EditTarget::Title, windows.title),
            content: DebouncedWrite::new(EditTarget::Content, windows.content),
        }
    }

    pub fn page_id(&self) -> Uuid {
        self.page_id
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title.push(&self.sink, self.page_id, title.into());
    }

    pub fn set_content(&mut self, html: impl Into<String>) {
        self.content.push(&self.sink, self.page_id, html.into());
    }

    /// Value waiting for its window to elapse, if any.
    pub fn pending(&self, target: EditTarget) -> Option<String> {
        match target {
            EditTarget::Title => self.title.pending(),
            EditTarget::Content => self.content.pending(),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.title.pending().is_some() || self.content.pending().is_some()
    }

    /// Write both pending values now. Both channels are attempted; the
    /// first failure is returned.
    pub async fn flush(&mut self) -> Result<(), StoreError> {
        let title = self.title.flush(self.sink.as_ref(), self.page_id).await;
        let content = self.content.flush(self.sink.as_ref(), self.page_id).await;
        title.and(content)
    }
}
