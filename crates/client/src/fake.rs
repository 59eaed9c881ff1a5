// In-memory `RemoteClient` for unit tests.
//
// Behaves like a small API server: pages, trash, favorites and blocks are
// real collections, so store operations can be checked against what the
// "server" ends up holding. Individual operations can be made to fail.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use folio_common::types::{
    Block, BlockUpdate, FileUpload, MatchedIn, NewBlock, NewPage, NewWorkspace, Page, PageMove,
    PageUpdate, SearchHit, SearchQuery, SearchResponse, UploadedFile, Workspace, WorkspaceUpdate,
};

use crate::lock;
use crate::remote::{RemoteClient, RemoteError};

#[derive(Default)]
struct FakeState {
    workspaces: Vec<Workspace>,
    pages: Vec<Page>,
    favorites: HashSet<Uuid>,
    blocks: Vec<Block>,
    failing: HashSet<&'static str>,
    calls: HashMap<&'static str, usize>,
}

#[derive(Default)]
pub(crate) struct FakeRemote {
    state: Mutex<FakeState>,
}

pub(crate) fn workspace(name: &str) -> Workspace {
    Workspace {
        id: Uuid::new_v4(),
        name: name.into(),
        description: None,
        icon: None,
        is_personal: false,
        owner_id: Uuid::nil(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn page(workspace_id: Uuid, title: &str, parent_id: Option<Uuid>) -> Page {
    Page {
        id: Uuid::new_v4(),
        workspace_id,
        title: title.into(),
        icon: None,
        cover_image: None,
        parent_id,
        is_archived: false,
        is_public: false,
        public_slug: None,
        created_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn not_found(what: &str) -> RemoteError {
    RemoteError::Status { status: 404, detail: format!("{what} not found") }
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_workspace(&self, name: &str) -> Workspace {
        let ws = workspace(name);
        lock(&self.state).workspaces.push(ws.clone());
        ws
    }

    pub(crate) fn add_page(&self, workspace_id: Uuid, title: &str, parent: Option<Uuid>) -> Page {
        let page = page(workspace_id, title, parent);
        lock(&self.state).pages.push(page.clone());
        page
    }

    pub(crate) fn add_block(&self, block: Block) {
        lock(&self.state).blocks.push(block);
    }

    pub(crate) fn fail(&self, op: &'static str) {
        lock(&self.state).failing.insert(op);
    }

    pub(crate) fn heal(&self, op: &'static str) {
        lock(&self.state).failing.remove(op);
    }

    pub(crate) fn calls(&self, op: &str) -> usize {
        lock(&self.state).calls.get(op).copied().unwrap_or(0)
    }

    pub(crate) fn stored_page(&self, id: Uuid) -> Option<Page> {
        lock(&self.state).pages.iter().find(|p| p.id == id).cloned()
    }

    pub(crate) fn blocks_of(&self, page_id: Uuid) -> Vec<Block> {
        lock(&self.state).blocks.iter().filter(|b| b.page_id == page_id).cloned().collect()
    }

    /// Count the call and fail it if scripted to.
    fn enter(&self, op: &'static str) -> Result<(), RemoteError> {
        let mut state = lock(&self.state);
        *state.calls.entry(op).or_default() += 1;
        if state.failing.contains(op) {
            return Err(RemoteError::Status { status: 500, detail: format!("{op} failed") });
        }
        Ok(())
    }

    fn with_page<T>(&self, id: Uuid, f: impl FnOnce(&mut Page) -> T) -> Result<T, RemoteError> {
        let mut state = lock(&self.state);
        let page = state.pages.iter_mut().find(|p| p.id == id).ok_or_else(|| not_found("page"))?;
        Ok(f(page))
    }
}

impl RemoteClient for FakeRemote {
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, RemoteError> {
        self.enter("list_workspaces")?;
        Ok(lock(&self.state).workspaces.clone())
    }

    async fn create_workspace(&self, body: &NewWorkspace) -> Result<Workspace, RemoteError> {
        self.enter("create_workspace")?;
        let mut ws = workspace(&body.name);
        ws.icon = body.icon.clone();
        lock(&self.state).workspaces.push(ws.clone());
        Ok(ws)
    }

    async fn update_workspace(
        &self,
        id: Uuid,
        body: &WorkspaceUpdate,
    ) -> Result<Workspace, RemoteError> {
        self.enter("update_workspace")?;
        let mut state = lock(&self.state);
        let ws =
            state.workspaces.iter_mut().find(|w| w.id == id).ok_or_else(|| not_found("workspace"))?;
        body.apply_to(ws);
        Ok(ws.clone())
    }

    async fn delete_workspace(&self, id: Uuid) -> Result<(), RemoteError> {
        self.enter("delete_workspace")?;
        let mut state = lock(&self.state);
        state.workspaces.retain(|w| w.id != id);
        state.pages.retain(|p| p.workspace_id != id);
        Ok(())
    }

    async fn list_pages(&self, workspace_id: Uuid) -> Result<Vec<Page>, RemoteError> {
        self.enter("list_pages")?;
        let state = lock(&self.state);
        Ok(state
            .pages
            .iter()
            .filter(|p| p.workspace_id == workspace_id && !p.is_archived)
            .cloned()
            .collect())
    }

    async fn list_trash(&self, workspace_id: Uuid) -> Result<Vec<Page>, RemoteError> {
        self.enter("list_trash")?;
        tokio::task::yield_now().await;
        let state = lock(&self.state);
        Ok(state
            .pages
            .iter()
            .filter(|p| p.workspace_id == workspace_id && p.is_archived)
            .cloned()
            .collect())
    }

    async fn create_page(&self, body: &NewPage) -> Result<Page, RemoteError> {
        self.enter("create_page")?;
        Ok(self.add_page(body.workspace_id, &body.title, body.parent_id))
    }

    async fn get_page(&self, id: Uuid) -> Result<Page, RemoteError> {
        self.enter("get_page")?;
        self.stored_page(id).ok_or_else(|| not_found("page"))
    }

    async fn update_page(&self, id: Uuid, body: &PageUpdate) -> Result<Page, RemoteError> {
        self.enter("update_page")?;
        self.with_page(id, |page| {
            body.apply_to(page);
            page.clone()
        })
    }

    async fn move_page(&self, id: Uuid, body: &PageMove) -> Result<Page, RemoteError> {
        self.enter("move_page")?;
        self.with_page(id, |page| {
            page.parent_id = body.new_parent_id;
            page.clone()
        })
    }

    async fn archive_page(&self, id: Uuid) -> Result<(), RemoteError> {
        self.enter("archive_page")?;
        self.with_page(id, |page| page.is_archived = true)
    }

    async fn restore_page(&self, id: Uuid) -> Result<Page, RemoteError> {
        self.enter("restore_page")?;
        self.with_page(id, |page| {
            page.is_archived = false;
            page.clone()
        })
    }

    async fn delete_page(&self, id: Uuid) -> Result<(), RemoteError> {
        self.enter("delete_page")?;
        let mut state = lock(&self.state);
        let before = state.pages.len();
        state.pages.retain(|p| p.id != id);
        state.favorites.remove(&id);
        if state.pages.len() == before {
            return Err(not_found("page"));
        }
        Ok(())
    }

    async fn duplicate_page(&self, id: Uuid) -> Result<Page, RemoteError> {
        self.enter("duplicate_page")?;
        let original = self.stored_page(id).ok_or_else(|| not_found("page"))?;
        let title = format!("{} (copy)", original.title);
        Ok(self.add_page(original.workspace_id, &title, original.parent_id))
    }

    async fn list_favorites(&self) -> Result<Vec<Page>, RemoteError> {
        self.enter("list_favorites")?;
        tokio::task::yield_now().await;
        let state = lock(&self.state);
        Ok(state.pages.iter().filter(|p| state.favorites.contains(&p.id)).cloned().collect())
    }

    async fn add_favorite(&self, page_id: Uuid) -> Result<(), RemoteError> {
        self.enter("add_favorite")?;
        lock(&self.state).favorites.insert(page_id);
        Ok(())
    }

    async fn remove_favorite(&self, page_id: Uuid) -> Result<(), RemoteError> {
        self.enter("remove_favorite")?;
        lock(&self.state).favorites.remove(&page_id);
        Ok(())
    }

    async fn favorite_status(&self, page_id: Uuid) -> Result<bool, RemoteError> {
        self.enter("favorite_status")?;
        Ok(lock(&self.state).favorites.contains(&page_id))
    }

    async fn list_blocks(&self, page_id: Uuid) -> Result<Vec<Block>, RemoteError> {
        self.enter("list_blocks")?;
        let blocks = self.blocks_of(page_id);
        // Let other saves interleave between the read and the write.
        tokio::task::yield_now().await;
        Ok(blocks)
    }

    async fn create_block(&self, body: &NewBlock) -> Result<Block, RemoteError> {
        self.enter("create_block")?;
        let block = Block {
            id: Uuid::new_v4(),
            page_id: body.page_id,
            kind: body.kind,
            content: body.content.clone(),
            parent_id: None,
            position: body.order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        lock(&self.state).blocks.push(block.clone());
        Ok(block)
    }

    async fn update_block(&self, id: Uuid, body: &BlockUpdate) -> Result<Block, RemoteError> {
        self.enter("update_block")?;
        let mut state = lock(&self.state);
        let block =
            state.blocks.iter_mut().find(|b| b.id == id).ok_or_else(|| not_found("block"))?;
        block.content = body.content.clone();
        Ok(block.clone())
    }

    /// Case-insensitive title match over the live pages of the workspace.
    async fn search(&self, body: &SearchQuery) -> Result<SearchResponse, RemoteError> {
        self.enter("search")?;
        let needle = body.query.to_lowercase();
        let state = lock(&self.state);
        let matches: Vec<SearchHit> = state
            .pages
            .iter()
            .filter(|p| p.workspace_id == body.workspace_id && !p.is_archived)
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .map(|p| SearchHit {
                page_id: p.id,
                page_title: p.title.clone(),
                page_icon: p.icon.clone(),
                highlight: p.title.clone(),
                rank: 1.0,
                matched_in: MatchedIn::Title,
                matched_blocks: Vec::new(),
            })
            .collect();
        let total = matches.len();
        let results = matches.into_iter().take(body.limit as usize).collect();
        Ok(SearchResponse { results, total })
    }

    async fn upload_file(
        &self,
        file: &FileUpload,
        workspace_id: Uuid,
        _page_id: Option<Uuid>,
    ) -> Result<UploadedFile, RemoteError> {
        self.enter("upload_file")?;
        Ok(UploadedFile {
            id: Some(Uuid::new_v4()),
            filename: Some(file.file_name.clone()),
            storage_url: format!("https://files.example.com/{workspace_id}/{}", file.file_name),
        })
    }
}
