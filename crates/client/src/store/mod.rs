// Workspace store: canonical workspace/page collections for one session.
//
// The store is the only component that calls the remote authority for
// workspaces, pages, favorites and blocks. Operations fall in three groups:
//
//   list refreshes   fetch_*: failures are logged and recorded in `error`,
//                    the previous collection is kept
//   throwing         update/move/archive/restore/delete, workspace CRUD:
//                    the error is returned and local state is untouched
//   best-effort      create/duplicate/favorite status/block fetch/upload/search:
//                    failures collapse into None / false / empty
//
// State lives behind a std mutex that is never held across an await, so
// independent operations interleave freely and the last response wins.

pub mod content;
pub mod ledger;

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use folio_common::tree::{build_tree, live_pages, validate_move, MoveError, PageNode};
use folio_common::types::{
    editor_content_payload, Block, BlockType, BlockUpdate, FileUpload, NewBlock, NewPage,
    NewWorkspace, Page, PageMove, PageUpdate, SearchHit, SearchQuery, Workspace, WorkspaceUpdate,
};

use crate::lock;
use crate::remote::{RemoteClient, RemoteError};
use crate::session::{SessionError, SessionFile, SessionState};

use self::content::ContentGates;

const DEFAULT_PAGE_CACHE_TTL: Duration = Duration::from_secs(30);

/// Server-side bounds on a search page size.
const SEARCH_LIMIT_RANGE: (u32, u32) = (1, 100);

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("no workspace is selected")]
    NoWorkspace,

    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),
}

impl StoreError {
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(error) => Some(error),
            _ => None,
        }
    }
}

// ── State ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct StoreState {
    workspaces: Vec<Workspace>,
    current_workspace: Option<Workspace>,
    pages: Vec<Page>,
    trash_pages: Vec<Page>,
    favorites: Vec<Page>,
    /// Last successful page list refresh; drives the `get_page` cache.
    pages_refreshed_at: Option<Instant>,
    refreshes_in_flight: usize,
    error: Option<String>,
}

impl StoreState {
    fn current_id(&self) -> Option<Uuid> {
        self.current_workspace.as_ref().map(|w| w.id)
    }

    /// A list response for `workspace_id` still applies to the selection.
    fn accepts(&self, workspace_id: Uuid) -> bool {
        self.current_id().is_none_or(|current| current == workspace_id)
    }

    fn clear_workspace_views(&mut self) {
        self.pages.clear();
        self.trash_pages.clear();
        self.pages_refreshed_at = None;
    }

    fn session(&self) -> SessionState {
        SessionState {
            current_workspace: self.current_workspace.clone(),
            workspaces: self.workspaces.clone(),
        }
    }
}

/// Owned copy of the store's collections at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub workspaces: Vec<Workspace>,
    pub current_workspace: Option<Workspace>,
    pub pages: Vec<Page>,
    pub trash_pages: Vec<Page>,
    pub favorites: Vec<Page>,
    pub is_loading: bool,
    pub error: Option<String>,
}

// ── Store ──────────────────────────────────────────────────────────

/// Single source of truth for one session's workspace and page state.
pub struct WorkspaceStore<R: RemoteClient> {
    remote: R,
    state: Mutex<StoreState>,
    content_gates: ContentGates,
    session: Option<SessionFile>,
    /// Held across snapshot + write so the newest snapshot lands last.
    persisting: Mutex<()>,
    page_cache_ttl: Duration,
}

impl<R: RemoteClient> WorkspaceStore<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            state: Mutex::new(StoreState::default()),
            content_gates: ContentGates::default(),
            session: None,
            persisting: Mutex::new(()),
            page_cache_ttl: DEFAULT_PAGE_CACHE_TTL,
        }
    }

    /// Persist workspace list and selection to `session` on every change.
    pub fn with_session(mut self, session: SessionFile) -> Self {
        self.session = Some(session);
        self
    }

    /// How long `get_page` trusts the local page list after a refresh.
    pub fn with_page_cache_ttl(mut self, ttl: Duration) -> Self {
        self.page_cache_ttl = ttl;
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        lock(&self.state)
    }

    // ── Session ────────────────────────────────────────────────────

    /// Load the persisted workspace list and selection, if a session file
    /// is attached. Page collections are left empty.
    pub fn restore_session(&self) -> Result<(), SessionError> {
        let Some(file) = &self.session else {
            return Ok(());
        };
        let restored = file.load()?;
        let mut state = self.state();
        state.workspaces = restored.workspaces;
        state.current_workspace = restored.current_workspace;
        state.clear_workspace_views();
        debug!(
            workspaces = state.workspaces.len(),
            current = ?state.current_id(),
            "restored session"
        );
        Ok(())
    }

    fn persist_session(&self) {
        let Some(file) = &self.session else {
            return;
        };
        let _persisting = lock(&self.persisting);
        let snapshot = self.state().session();
        if let Err(error) = file.save(&snapshot) {
            warn!(path = %file.path().display(), %error, "failed to persist session");
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state();
        StoreSnapshot {
            workspaces: state.workspaces.clone(),
            current_workspace: state.current_workspace.clone(),
            pages: state.pages.clone(),
            trash_pages: state.trash_pages.clone(),
            favorites: state.favorites.clone(),
            is_loading: state.refreshes_in_flight > 0,
            error: state.error.clone(),
        }
    }

    pub fn workspaces(&self) -> Vec<Workspace> {
        self.state().workspaces.clone()
    }

    pub fn current_workspace(&self) -> Option<Workspace> {
        self.state().current_workspace.clone()
    }

    /// Id of the selected workspace, or `NoWorkspace`.
    pub fn current_workspace_id(&self) -> Result<Uuid, StoreError> {
        self.state().current_id().ok_or(StoreError::NoWorkspace)
    }

    pub fn pages(&self) -> Vec<Page> {
        self.state().pages.clone()
    }

    pub fn trash_pages(&self) -> Vec<Page> {
        self.state().trash_pages.clone()
    }

    pub fn favorites(&self) -> Vec<Page> {
        self.state().favorites.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn clear_error(&self) {
        self.state().error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.state().refreshes_in_flight > 0
    }

    /// Live page forest, rebuilt from the current list on every call.
    pub fn page_tree(&self) -> Vec<PageNode> {
        let live = live_pages(&self.state().pages);
        build_tree(&live)
    }

    // ── List refreshes (non-fatal) ─────────────────────────────────

    fn begin_refresh(&self) {
        self.state().refreshes_in_flight += 1;
    }

    fn end_refresh(&self) {
        let mut state = self.state();
        state.refreshes_in_flight = state.refreshes_in_flight.saturating_sub(1);
    }

    fn record_error(&self, what: &str, error: &RemoteError) {
        warn!(%error, "{what}");
        self.state().error = Some(format!("{what}: {error}"));
    }

    /// Load all visible workspaces. Selects the first one when nothing is
    /// selected (or the selection vanished), otherwise refreshes the pages
    /// of the current selection. Never fails; see `error()`.
    pub async fn fetch_workspaces(&self) {
        self.begin_refresh();
        let result = self.remote.list_workspaces().await;
        self.end_refresh();

        let workspaces = match result {
            Ok(workspaces) => workspaces,
            Err(error) => {
                self.record_error("failed to fetch workspaces", &error);
                return;
            }
        };

        let target = {
            let mut state = self.state();
            let previous = state.current_id();
            let refreshed = previous.and_then(|id| workspaces.iter().find(|w| w.id == id).cloned());
            state.current_workspace = refreshed.or_else(|| workspaces.first().cloned());
            state.workspaces = workspaces;
            state.error = None;

            let current = state.current_id();
            if current != previous {
                state.clear_workspace_views();
                info!(workspace = ?current, "selected workspace");
            }
            current
        };

        self.persist_session();
        if let Some(workspace_id) = target {
            self.fetch_pages(workspace_id).await;
        }
    }

    /// Switch the current workspace and refresh its pages. Unknown ids are
    /// ignored (returns `false`).
    pub async fn select_workspace(&self, workspace_id: Uuid) -> bool {
        {
            let mut state = self.state();
            let Some(workspace) = state.workspaces.iter().find(|w| w.id == workspace_id).cloned()
            else {
                debug!(%workspace_id, "ignoring selection of unknown workspace");
                return false;
            };
            if state.current_id() != Some(workspace_id) {
                state.clear_workspace_views();
            }
            state.current_workspace = Some(workspace);
        }

        info!(%workspace_id, "selected workspace");
        self.persist_session();
        self.fetch_pages(workspace_id).await;
        true
    }

    /// Replace the live page list with the remote one.
    pub async fn fetch_pages(&self, workspace_id: Uuid) {
        self.begin_refresh();
        let result = self.remote.list_pages(workspace_id).await;
        self.end_refresh();

        match result {
            Ok(pages) => {
                let mut state = self.state();
                if !state.accepts(workspace_id) {
                    debug!(%workspace_id, "dropping page list for deselected workspace");
                    return;
                }
                debug!(%workspace_id, count = pages.len(), "page list refreshed");
                state.pages = pages;
                state.pages_refreshed_at = Some(Instant::now());
                state.error = None;
            }
            Err(error) => self.record_error("failed to fetch pages", &error),
        }
    }

    /// Replace the trash view with the remote one.
    pub async fn fetch_trash(&self, workspace_id: Uuid) {
        self.begin_refresh();
        let result = self.remote.list_trash(workspace_id).await;
        self.end_refresh();

        match result {
            Ok(trash) => {
                let mut state = self.state();
                if !state.accepts(workspace_id) {
                    debug!(%workspace_id, "dropping trash list for deselected workspace");
                    return;
                }
                debug!(%workspace_id, count = trash.len(), "trash refreshed");
                state.trash_pages = trash;
                state.error = None;
            }
            Err(error) => self.record_error("failed to fetch trash", &error),
        }
    }

    /// Replace the favorites view with the remote one.
    pub async fn fetch_favorites(&self) {
        self.begin_refresh();
        let result = self.remote.list_favorites().await;
        self.end_refresh();

        match result {
            Ok(favorites) => {
                let mut state = self.state();
                debug!(count = favorites.len(), "favorites refreshed");
                state.favorites = favorites;
                state.error = None;
            }
            Err(error) => self.record_error("failed to fetch favorites", &error),
        }
    }

    // ── Workspace mutations (throwing) ─────────────────────────────

    /// Create a workspace and append it. Becomes the selection when nothing
    /// is selected yet.
    pub async fn create_workspace(
        &self,
        name: &str,
        icon: Option<String>,
    ) -> Result<Workspace, StoreError> {
        let body = NewWorkspace { name: name.to_string(), icon };
        let workspace = self.remote.create_workspace(&body).await?;

        let select = {
            let mut state = self.state();
            state.workspaces.push(workspace.clone());
            if state.current_workspace.is_none() {
                state.current_workspace = Some(workspace.clone());
                state.clear_workspace_views();
                true
            } else {
                false
            }
        };

        info!(workspace_id = %workspace.id, name = %workspace.name, "created workspace");
        self.persist_session();
        if select {
            self.fetch_pages(workspace.id).await;
        }
        Ok(workspace)
    }

    pub async fn update_workspace(
        &self,
        workspace_id: Uuid,
        update: &WorkspaceUpdate,
    ) -> Result<(), StoreError> {
        self.remote.update_workspace(workspace_id, update).await?;

        {
            let mut state = self.state();
            if let Some(workspace) = state.workspaces.iter_mut().find(|w| w.id == workspace_id) {
                update.apply_to(workspace);
            }
            if let Some(current) =
                state.current_workspace.as_mut().filter(|w| w.id == workspace_id)
            {
                update.apply_to(current);
            }
        }

        self.persist_session();
        Ok(())
    }

    /// Delete a workspace. Deleting the selection clears it together with
    /// its page and trash views.
    pub async fn delete_workspace(&self, workspace_id: Uuid) -> Result<(), StoreError> {
        self.remote.delete_workspace(workspace_id).await?;

        {
            let mut state = self.state();
            state.workspaces.retain(|w| w.id != workspace_id);
            if state.current_id() == Some(workspace_id) {
                state.current_workspace = None;
                state.clear_workspace_views();
            }
        }

        info!(%workspace_id, "deleted workspace");
        self.persist_session();
        Ok(())
    }

    // ── Page mutations ─────────────────────────────────────────────

    /// Create a page in the current workspace. `None` when no workspace is
    /// selected (no remote call is made) or when the remote call fails.
    pub async fn create_page(&self, title: &str, parent_id: Option<Uuid>) -> Option<Page> {
        let Some(workspace_id) = self.state().current_id() else {
            debug!("create_page without a selected workspace");
            return None;
        };

        let body = NewPage { workspace_id, title: title.to_string(), parent_id };
        match self.remote.create_page(&body).await {
            Ok(page) => {
                info!(page_id = %page.id, %workspace_id, "created page");
                self.state().pages.push(page.clone());
                Some(page)
            }
            Err(error) => {
                warn!(%workspace_id, %error, "failed to create page");
                None
            }
        }
    }

    /// Send a partial update; on success shallow-merge it into the local
    /// record and its favorites entry.
    pub async fn update_page(&self, page_id: Uuid, update: &PageUpdate) -> Result<(), StoreError> {
        self.remote.update_page(page_id, update).await?;

        let mut state = self.state();
        let StoreState { pages, favorites, .. } = &mut *state;
        for page in pages.iter_mut().chain(favorites.iter_mut()).filter(|p| p.id == page_id) {
            update.apply_to(page);
        }
        debug!(%page_id, "page updated");
        Ok(())
    }

    /// Reparent and/or reorder a page. Moves that would break the forest are
    /// rejected before any remote call.
    pub async fn move_page(
        &self,
        page_id: Uuid,
        new_parent_id: Option<Uuid>,
        new_order: i32,
    ) -> Result<(), StoreError> {
        validate_move(&self.state().pages, page_id, new_parent_id)?;

        let body = PageMove { new_parent_id, new_order };
        let moved = self.remote.move_page(page_id, &body).await?;

        let mut state = self.state();
        if let Some(page) = state.pages.iter_mut().find(|p| p.id == page_id) {
            page.parent_id = moved.parent_id;
        }
        info!(%page_id, parent = ?moved.parent_id, "moved page");
        Ok(())
    }

    /// Soft delete: drop the page from the live list (and favorites view),
    /// then refresh trash.
    pub async fn archive_page(&self, page_id: Uuid) -> Result<(), StoreError> {
        self.remote.archive_page(page_id).await?;

        let workspace_id = {
            let mut state = self.state();
            let workspace_id = state
                .pages
                .iter()
                .find(|p| p.id == page_id)
                .map(|p| p.workspace_id)
                .or_else(|| state.current_id());
            state.pages.retain(|p| p.id != page_id);
            state.favorites.retain(|p| p.id != page_id);
            workspace_id
        };

        info!(%page_id, "archived page");
        if let Some(workspace_id) = workspace_id {
            self.fetch_trash(workspace_id).await;
        }
        Ok(())
    }

    /// Restore from trash, then refetch both live and trash lists so the
    /// page lands back in its correct tree position.
    pub async fn restore_page(&self, page_id: Uuid) -> Result<(), StoreError> {
        let restored = self.remote.restore_page(page_id).await?;
        info!(%page_id, "restored page");

        let workspace_id = restored.workspace_id;
        tokio::join!(self.fetch_pages(workspace_id), self.fetch_trash(workspace_id));
        Ok(())
    }

    /// Permanent delete of a trashed page.
    pub async fn delete_page(&self, page_id: Uuid) -> Result<(), StoreError> {
        self.remote.delete_page(page_id).await?;

        let mut state = self.state();
        state.trash_pages.retain(|p| p.id != page_id);
        state.favorites.retain(|p| p.id != page_id);
        info!(%page_id, "permanently deleted page");
        Ok(())
    }

    /// Duplicate a page, then refetch the page list (the copy may reshape
    /// the tree). `None` on failure.
    pub async fn duplicate_page(&self, page_id: Uuid) -> Option<Page> {
        match self.remote.duplicate_page(page_id).await {
            Ok(copy) => {
                info!(%page_id, copy_id = %copy.id, "duplicated page");
                self.fetch_pages(copy.workspace_id).await;
                Some(copy)
            }
            Err(error) => {
                warn!(%page_id, %error, "failed to duplicate page");
                None
            }
        }
    }

    /// Page by id: served from the local list while it is fresh, otherwise
    /// fetched. The fallback never populates the local list.
    pub async fn get_page(&self, page_id: Uuid) -> Result<Page, StoreError> {
        {
            let state = self.state();
            let fresh = state
                .pages_refreshed_at
                .is_some_and(|refreshed| refreshed.elapsed() < self.page_cache_ttl);
            if fresh {
                if let Some(page) = state.pages.iter().find(|p| p.id == page_id) {
                    return Ok(page.clone());
                }
            }
        }

        debug!(%page_id, "page not cached, fetching");
        Ok(self.remote.get_page(page_id).await?)
    }

    // ── Favorites ──────────────────────────────────────────────────

    /// Mark as favorite, then refetch favorites regardless of the outcome.
    pub async fn add_favorite(&self, page_id: Uuid) -> Result<(), StoreError> {
        let result = self.remote.add_favorite(page_id).await;
        self.fetch_favorites().await;
        result.map_err(|error| {
            warn!(%page_id, %error, "failed to add favorite");
            error.into()
        })
    }

    /// Unmark as favorite, then refetch favorites regardless of the outcome.
    pub async fn remove_favorite(&self, page_id: Uuid) -> Result<(), StoreError> {
        let result = self.remote.remove_favorite(page_id).await;
        self.fetch_favorites().await;
        result.map_err(|error| {
            warn!(%page_id, %error, "failed to remove favorite");
            error.into()
        })
    }

    /// Favorite status check; any failure reads as "not favorited".
    pub async fn check_favorite_status(&self, page_id: Uuid) -> bool {
        match self.remote.favorite_status(page_id).await {
            Ok(is_favorited) => is_favorited,
            Err(error) => {
                debug!(%page_id, %error, "favorite status check failed");
                false
            }
        }
    }

    // ── Blocks & content ───────────────────────────────────────────

    /// Blocks of a page ordered by position. Empty on failure, so callers
    /// must read empty as "unknown", not "page is blank".
    pub async fn fetch_page_blocks(&self, page_id: Uuid) -> Vec<Block> {
        match self.remote.list_blocks(page_id).await {
            Ok(mut blocks) => {
                blocks.sort_by_key(|block| block.position);
                blocks
            }
            Err(error) => {
                warn!(%page_id, %error, "failed to fetch blocks");
                Vec::new()
            }
        }
    }

    /// Write the page body into its single `editor_content` block, creating
    /// it at position 0 when missing. Saves for one page run one at a time;
    /// a save still waiting when a newer one arrives is skipped.
    pub async fn save_page_content(&self, page_id: Uuid, html: &str) -> Result<(), StoreError> {
        let ticket = self.content_gates.enter(page_id);
        let _turn = ticket.turn().await;
        if ticket.is_superseded() {
            debug!(%page_id, "content save superseded by a newer one");
            return Ok(());
        }

        let block = self.upsert_editor_content(page_id, html).await?;
        debug!(%page_id, block_id = %block.id, bytes = html.len(), "saved page content");
        Ok(())
    }

    async fn upsert_editor_content(&self, page_id: Uuid, html: &str) -> Result<Block, StoreError> {
        let blocks = self.remote.list_blocks(page_id).await?;
        let content = editor_content_payload(html);

        let existing =
            blocks.iter().filter(|block| block.is_editor_content()).min_by_key(|b| b.position);
        let block = match existing {
            Some(block) => self.remote.update_block(block.id, &BlockUpdate { content }).await?,
            None => {
                let body =
                    NewBlock { page_id, kind: BlockType::EditorContent, content, order: 0 };
                let block = self.remote.create_block(&body).await?;
                info!(%page_id, block_id = %block.id, "created editor content block");
                block
            }
        };
        Ok(block)
    }

    /// Serialized body of a page, if its content block could be read.
    pub async fn load_page_content(&self, page_id: Uuid) -> Option<String> {
        self.fetch_page_blocks(page_id)
            .await
            .iter()
            .find_map(|block| block.editor_html().map(str::to_string))
    }

    // ── Search ─────────────────────────────────────────────────────

    /// Full-text search in the current workspace, best match first. Empty
    /// for a blank query, without a selected workspace (no remote call is
    /// made in either case) or on failure.
    pub async fn search(&self, query: &str, limit: u32) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let Some(workspace_id) = self.state().current_id() else {
            debug!("search without a selected workspace");
            return Vec::new();
        };

        let (min, max) = SEARCH_LIMIT_RANGE;
        let body =
            SearchQuery { query: query.to_string(), workspace_id, limit: limit.clamp(min, max) };
        match self.remote.search(&body).await {
            Ok(response) => {
                let hits = response.results.len();
                debug!(%workspace_id, hits, total = response.total, "search finished");
                response.results
            }
            Err(error) => {
                warn!(%workspace_id, %error, "search failed");
                Vec::new()
            }
        }
    }

    // ── Files ──────────────────────────────────────────────────────

    /// Upload a file; returns its storage URL, or `None` on failure.
    pub async fn upload_file(
        &self,
        file: &FileUpload,
        workspace_id: Uuid,
        page_id: Option<Uuid>,
    ) -> Option<String> {
        match self.remote.upload_file(file, workspace_id, page_id).await {
            Ok(uploaded) => {
                info!(file = %file.file_name, url = %uploaded.storage_url, "uploaded file");
                Some(uploaded.storage_url)
            }
            Err(error) => {
                warn!(file = %file.file_name, %error, "failed to upload file");
                None
            }
        }
    }
}
