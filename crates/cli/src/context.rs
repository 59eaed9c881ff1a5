// Shared command context: config, remote and store for one invocation.

use std::sync::Arc;

use anyhow::{bail, Context as _};
use tracing::{debug, warn};
use uuid::Uuid;

use folio_client::config::{self, ClientConfig};
use folio_client::session::SessionFile;
use folio_client::{EditWindows, HttpRemote, StoreError, WorkspaceStore};
use folio_common::types::{Page, Workspace};

pub type Store = WorkspaceStore<HttpRemote>;

pub struct Context {
    pub store: Arc<Store>,
    pub config: ClientConfig,
}

impl Context {
    /// Build the store from `~/.folio/config.toml`, `FOLIO_*` env vars and
    /// the persisted session.
    pub fn open(api_url: Option<String>) -> anyhow::Result<Self> {
        let config = ClientConfig::load();
        let api_url = api_url.unwrap_or_else(|| config.effective_api_url());
        let remote =
            HttpRemote::with_timeout(&api_url, config::token_from_env(), config.request_timeout())
                .with_context(|| format!("cannot use API URL `{api_url}`"))?;
        debug!(%api_url, "opening store");

        let mut store = WorkspaceStore::new(remote).with_page_cache_ttl(config.page_cache_ttl());
        if let Some(path) = config::session_path() {
            store = store.with_session(SessionFile::new(path));
        }
        if let Err(error) = store.restore_session() {
            warn!(%error, "ignoring unreadable session");
        }
        Ok(Self { store: Arc::new(store), config })
    }

    pub fn edit_windows(&self) -> EditWindows {
        EditWindows::from(&self.config.sync)
    }

    /// Fail with the store's recorded error, if the last refresh set one.
    pub fn check_refresh(&self) -> anyhow::Result<()> {
        match self.store.error() {
            Some(error) => bail!(error),
            None => Ok(()),
        }
    }

    /// Refresh the workspace list (and the selection's pages).
    pub async fn refresh_workspaces(&self) -> anyhow::Result<Vec<Workspace>> {
        self.store.fetch_workspaces().await;
        self.check_refresh()?;
        Ok(self.store.workspaces())
    }

    /// Selected workspace, fetching the list first when the session has
    /// none.
    pub async fn workspace(&self) -> anyhow::Result<Workspace> {
        if let Some(workspace) = self.store.current_workspace() {
            return Ok(workspace);
        }
        self.refresh_workspaces().await?;
        self.store.current_workspace().ok_or_else(|| StoreError::NoWorkspace.into())
    }

    /// Live pages of the selected workspace, freshly fetched.
    pub async fn live_pages(&self) -> anyhow::Result<(Workspace, Vec<Page>)> {
        let workspace = self.workspace().await?;
        self.store.fetch_pages(workspace.id).await;
        self.check_refresh()?;
        Ok((workspace, self.store.pages()))
    }

    /// Trash of the selected workspace, freshly fetched.
    pub async fn trash(&self) -> anyhow::Result<Vec<Page>> {
        let workspace = self.workspace().await?;
        self.store.fetch_trash(workspace.id).await;
        self.check_refresh()?;
        Ok(self.store.trash_pages())
    }

    /// Resolve a live page by id or title.
    pub async fn page(&self, reference: &str) -> anyhow::Result<Page> {
        if let Ok(id) = reference.parse::<Uuid>() {
            return Ok(self.store.get_page(id).await?);
        }
        let (_, pages) = self.live_pages().await?;
        find_page(&pages, reference).cloned()
    }

    /// Resolve a page id, searching the trash when given a title.
    pub async fn trashed_page_id(&self, reference: &str) -> anyhow::Result<Uuid> {
        if let Ok(id) = reference.parse::<Uuid>() {
            return Ok(id);
        }
        let trash = self.trash().await?;
        Ok(find_page(&trash, reference)?.id)
    }

    /// Resolve a workspace by id or name.
    pub async fn workspace_ref(&self, reference: &str) -> anyhow::Result<Workspace> {
        let workspaces = self.refresh_workspaces().await?;
        find_workspace(&workspaces, reference).cloned()
    }
}

/// Match by exact id, then by case-insensitive title. Ambiguous titles are
/// an error listing the candidates.
pub fn find_page<'a>(pages: &'a [Page], reference: &str) -> anyhow::Result<&'a Page> {
    if let Some(page) = pages.iter().find(|page| page.id.to_string() == reference) {
        return Ok(page);
    }
    let wanted = reference.trim().to_lowercase();
    let matches: Vec<&Page> =
        pages.iter().filter(|page| page.title.to_lowercase() == wanted).collect();
    match matches.as_slice() {
        [page] => Ok(*page),
        [] => bail!("page `{reference}` not found"),
        many => {
            let ids: Vec<String> = many.iter().map(|page| page.id.to_string()).collect();
            bail!("title `{reference}` matches {} pages; use an id: {}", many.len(), ids.join(", "))
        }
    }
}

pub fn find_workspace<'a>(
    workspaces: &'a [Workspace],
    reference: &str,
) -> anyhow::Result<&'a Workspace> {
    let wanted = reference.trim().to_lowercase();
    workspaces
        .iter()
        .find(|w| w.id.to_string() == reference)
        .or_else(|| workspaces.iter().find(|w| w.name.to_lowercase() == wanted))
        .with_context(|| format!("workspace `{reference}` not found"))
}
