// HTTP implementation of `RemoteClient` over reqwest.

use std::time::Duration;

use reqwest::{multipart, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use folio_common::protocol::routes;
use folio_common::types::{
    Block, BlockUpdate, FavoriteStatus, FileUpload, NewBlock, NewPage, NewWorkspace, Page,
    PageMove, PageUpdate, SearchQuery, SearchResponse, UploadedFile, Workspace, WorkspaceUpdate,
};

use super::{RemoteClient, RemoteError};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Error body shape used by the API (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// REST client for the remote authority.
///
/// `base_url` may carry a path prefix (e.g. `https://host/api/v1`); routes
/// are appended to it verbatim.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: Url,
    token: Option<String>,
    client: Client,
}

impl HttpRemote {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, RemoteError> {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::InvalidRequest(format!("failed to build http client: {e}")))?;
        Ok(Self { base_url, token, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, RemoteError> {
        join_route(&self.base_url, path)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn workspace_scoped(&self, path: &str, workspace_id: Uuid) -> Result<Url, RemoteError> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().append_pair(routes::WORKSPACE_ID_PARAM, &workspace_id.to_string());
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        decode(send(self.request(Method::GET, url)).await?).await
    }

    async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(send(self.request(method, url).json(body)).await?).await
    }

    async fn send_empty(&self, method: Method, url: Url) -> Result<(), RemoteError> {
        send(self.request(method, url)).await.map(|_| ())
    }
}

fn parse_base_url(raw: &str) -> Result<Url, RemoteError> {
    let url = Url::parse(raw)
        .map_err(|e| RemoteError::InvalidRequest(format!("invalid API URL `{raw}`: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RemoteError::InvalidRequest(format!("unsupported API URL scheme `{other}`"))),
    }
}

fn join_route(base: &Url, path: &str) -> Result<Url, RemoteError> {
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined)
        .map_err(|e| RemoteError::InvalidRequest(format!("invalid route `{joined}`: {e}")))
}

async fn send(builder: RequestBuilder) -> Result<Response, RemoteError> {
    let response = builder.send().await.map_err(|e| RemoteError::Transport(e.to_string()))?;
    let status = response.status();
    debug!(url = %response.url(), status = status.as_u16(), "remote response");
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(RemoteError::Status { status: status.as_u16(), detail: error_detail(&text) })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let bytes = response.bytes().await.map_err(|e| RemoteError::Transport(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
}

/// Extract a human-readable message from an error body.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { detail: serde_json::Value::String(detail) }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => "no error detail".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

impl RemoteClient for HttpRemote {
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, RemoteError> {
        self.get(self.url(routes::WORKSPACES)?).await
    }

    async fn create_workspace(&self, body: &NewWorkspace) -> Result<Workspace, RemoteError> {
        self.send_json(Method::POST, self.url(routes::WORKSPACES)?, body).await
    }

    async fn update_workspace(
        &self,
        id: Uuid,
        body: &WorkspaceUpdate,
    ) -> Result<Workspace, RemoteError> {
        self.send_json(Method::PATCH, self.url(&routes::workspace(id))?, body).await
    }

    async fn delete_workspace(&self, id: Uuid) -> Result<(), RemoteError> {
        self.send_empty(Method::DELETE, self.url(&routes::workspace(id))?).await
    }

    async fn list_pages(&self, workspace_id: Uuid) -> Result<Vec<Page>, RemoteError> {
        self.get(self.workspace_scoped(routes::PAGES, workspace_id)?).await
    }

    async fn list_trash(&self, workspace_id: Uuid) -> Result<Vec<Page>, RemoteError> {
        self.get(self.workspace_scoped(routes::PAGES_TRASH, workspace_id)?).await
    }

    async fn create_page(&self, body: &NewPage) -> Result<Page, RemoteError> {
        self.send_json(Method::POST, self.url(routes::PAGES)?, body).await
    }

    async fn get_page(&self, id: Uuid) -> Result<Page, RemoteError> {
        self.get(self.url(&routes::page(id))?).await
    }

    async fn update_page(&self, id: Uuid, body: &PageUpdate) -> Result<Page, RemoteError> {
        self.send_json(Method::PATCH, self.url(&routes::page(id))?, body).await
    }

    async fn move_page(&self, id: Uuid, body: &PageMove) -> Result<Page, RemoteError> {
        self.send_json(Method::PATCH, self.url(&routes::page_move(id))?, body).await
    }

    async fn archive_page(&self, id: Uuid) -> Result<(), RemoteError> {
        self.send_empty(Method::DELETE, self.url(&routes::page(id))?).await
    }

    async fn restore_page(&self, id: Uuid) -> Result<Page, RemoteError> {
        decode(send(self.request(Method::POST, self.url(&routes::page_restore(id))?)).await?).await
    }

    async fn delete_page(&self, id: Uuid) -> Result<(), RemoteError> {
        self.send_empty(Method::DELETE, self.url(&routes::page_permanent(id))?).await
    }

    async fn duplicate_page(&self, id: Uuid) -> Result<Page, RemoteError> {
        let url = self.url(&routes::page_duplicate(id))?;
        decode(send(self.request(Method::POST, url)).await?).await
    }

    async fn list_favorites(&self) -> Result<Vec<Page>, RemoteError> {
        self.get(self.url(routes::PAGES_FAVORITES)?).await
    }

    async fn add_favorite(&self, page_id: Uuid) -> Result<(), RemoteError> {
        self.send_empty(Method::POST, self.url(&routes::page_favorite(page_id))?).await
    }

    async fn remove_favorite(&self, page_id: Uuid) -> Result<(), RemoteError> {
        self.send_empty(Method::DELETE, self.url(&routes::page_favorite(page_id))?).await
    }

    async fn favorite_status(&self, page_id: Uuid) -> Result<bool, RemoteError> {
        let status: FavoriteStatus = self.get(self.url(&routes::page_favorite(page_id))?).await?;
        Ok(status.is_favorited)
    }

    async fn list_blocks(&self, page_id: Uuid) -> Result<Vec<Block>, RemoteError> {
        self.get(self.url(&routes::page_blocks(page_id))?).await
    }

    async fn create_block(&self, body: &NewBlock) -> Result<Block, RemoteError> {
        self.send_json(Method::POST, self.url(routes::BLOCKS)?, body).await
    }

    async fn update_block(&self, id: Uuid, body: &BlockUpdate) -> Result<Block, RemoteError> {
        self.send_json(Method::PATCH, self.url(&routes::block(id))?, body).await
    }

    async fn search(&self, body: &SearchQuery) -> Result<SearchResponse, RemoteError> {
        self.send_json(Method::POST, self.url(routes::SEARCH)?, body).await
    }

    async fn upload_file(
        &self,
        file: &FileUpload,
        workspace_id: Uuid,
        page_id: Option<Uuid>,
    ) -> Result<UploadedFile, RemoteError> {
        let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime) = &file.mime_type {
            part = part.mime_str(mime).map_err(|e| {
                RemoteError::InvalidRequest(format!("invalid MIME type `{mime}`: {e}"))
            })?;
        }

        let mut form =
            multipart::Form::new().part("file", part).text("workspace_id", workspace_id.to_string());
        if let Some(page_id) = page_id {
            form = form.text("page_id", page_id.to_string());
        }

        let builder = self.request(Method::POST, self.url(routes::FILES_UPLOAD)?).multipart(form);
        decode(send(builder).await?).await
    }
}
