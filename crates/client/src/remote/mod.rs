// Remote authority abstraction.
//
// The store talks to the server only through `RemoteClient`. Production
// uses `HttpRemote` (reqwest); tests plug in scripted mocks. Transport
// retry policy is out of scope: every method performs exactly one attempt.

pub mod http;

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use folio_common::types::{
    Block, BlockUpdate, FileUpload, NewBlock, NewPage, NewWorkspace, Page, PageMove, PageUpdate,
    SearchQuery, SearchResponse, UploadedFile, Workspace, WorkspaceUpdate,
};

pub use http::HttpRemote;

/// Errors from a remote call (network, server-side, or payload).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Request never produced a response (DNS, refused, timeout, ...).
    #[error("remote unreachable: {0}")]
    Transport(String),

    /// Server answered with a non-success status.
    #[error("remote returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Response body did not match the expected shape.
    #[error("failed to decode remote response: {0}")]
    Decode(String),

    /// Request could not be built (bad base URL, bad MIME type, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// Conventional resource CRUD API of the remote authority.
///
/// All methods return `Send` futures so the store can be driven from a
/// multi-threaded tokio runtime and from spawned debounce timers.
pub trait RemoteClient: Send + Sync + 'static {
    // ── Workspaces ─────────────────────────────────────────────────

    fn list_workspaces(&self) -> impl Future<Output = Result<Vec<Workspace>, RemoteError>> + Send;

    fn create_workspace(
        &self,
        body: &NewWorkspace,
    ) -> impl Future<Output = Result<Workspace, RemoteError>> + Send;

    fn update_workspace(
        &self,
        id: Uuid,
        body: &WorkspaceUpdate,
    ) -> impl Future<Output = Result<Workspace, RemoteError>> + Send;

    fn delete_workspace(&self, id: Uuid) -> impl Future<Output = Result<(), RemoteError>> + Send;

    // ── Pages ──────────────────────────────────────────────────────

    fn list_pages(
        &self,
        workspace_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Page>, RemoteError>> + Send;

    fn list_trash(
        &self,
        workspace_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Page>, RemoteError>> + Send;

    fn create_page(&self, body: &NewPage)
        -> impl Future<Output = Result<Page, RemoteError>> + Send;

    fn get_page(&self, id: Uuid) -> impl Future<Output = Result<Page, RemoteError>> + Send;

    fn update_page(
        &self,
        id: Uuid,
        body: &PageUpdate,
    ) -> impl Future<Output = Result<Page, RemoteError>> + Send;

    fn move_page(
        &self,
        id: Uuid,
        body: &PageMove,
    ) -> impl Future<Output = Result<Page, RemoteError>> + Send;

    /// Soft delete.
    fn archive_page(&self, id: Uuid) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn restore_page(&self, id: Uuid) -> impl Future<Output = Result<Page, RemoteError>> + Send;

    /// Hard delete.
    fn delete_page(&self, id: Uuid) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn duplicate_page(&self, id: Uuid) -> impl Future<Output = Result<Page, RemoteError>> + Send;

    // ── Favorites ──────────────────────────────────────────────────

    fn list_favorites(&self) -> impl Future<Output = Result<Vec<Page>, RemoteError>> + Send;

    fn add_favorite(&self, page_id: Uuid) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn remove_favorite(
        &self,
        page_id: Uuid,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn favorite_status(
        &self,
        page_id: Uuid,
    ) -> impl Future<Output = Result<bool, RemoteError>> + Send;

    // ── Blocks ─────────────────────────────────────────────────────

    fn list_blocks(
        &self,
        page_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Block>, RemoteError>> + Send;

    fn create_block(
        &self,
        body: &NewBlock,
    ) -> impl Future<Output = Result<Block, RemoteError>> + Send;

    fn update_block(
        &self,
        id: Uuid,
        body: &BlockUpdate,
    ) -> impl Future<Output = Result<Block, RemoteError>> + Send;

    // ── Search ─────────────────────────────────────────────────────

    fn search(
        &self,
        body: &SearchQuery,
    ) -> impl Future<Output = Result<SearchResponse, RemoteError>> + Send;

    // ── Files ──────────────────────────────────────────────────────

    fn upload_file(
        &self,
        file: &FileUpload,
        workspace_id: Uuid,
        page_id: Option<Uuid>,
    ) -> impl Future<Output = Result<UploadedFile, RemoteError>> + Send;
}
