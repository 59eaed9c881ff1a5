use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use folio_client::{EditWindows, HttpRemote, PageEditor, StoreError, WorkspaceStore};
use folio_common::types::{
    Block, BlockUpdate, NewBlock, NewPage, Page, PageUpdate, Workspace,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

// ── In-memory API ──────────────────────────────────────────────────

#[derive(Default)]
struct Api {
    workspaces: Vec<Workspace>,
    pages: Vec<Page>,
    favorites: HashSet<Uuid>,
    blocks: Vec<Block>,
    page_creates: usize,
    fail_page_updates: bool,
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Api>>);

impl Shared {
    fn api(&self) -> MutexGuard<'_, Api> {
        self.0.lock().expect("api lock")
    }
}

type Reply<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn missing(what: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": format!("{what} not found") })))
}

#[derive(Deserialize)]
struct WorkspaceQuery {
    workspace_id: Uuid,
}

async fn list_workspaces(State(shared): State<Shared>) -> Json<Vec<Workspace>> {
    Json(shared.api().workspaces.clone())
}

async fn list_pages(
    State(shared): State<Shared>,
    Query(query): Query<WorkspaceQuery>,
) -> Json<Vec<Page>> {
    let api = shared.api();
    Json(
        api.pages
            .iter()
            .filter(|p| p.workspace_id == query.workspace_id && !p.is_archived)
            .cloned()
            .collect(),
    )
}

async fn list_trash(
    State(shared): State<Shared>,
    Query(query): Query<WorkspaceQuery>,
) -> Json<Vec<Page>> {
    let api = shared.api();
    Json(
        api.pages
            .iter()
            .filter(|p| p.workspace_id == query.workspace_id && p.is_archived)
            .cloned()
            .collect(),
    )
}

async fn list_favorites(State(shared): State<Shared>) -> Json<Vec<Page>> {
    let api = shared.api();
    Json(api.pages.iter().filter(|p| api.favorites.contains(&p.id)).cloned().collect())
}

async fn create_page(State(shared): State<Shared>, Json(body): Json<NewPage>) -> Json<Page> {
    let page = new_page(body.workspace_id, &body.title, body.parent_id);
    let mut api = shared.api();
    api.page_creates += 1;
    api.pages.push(page.clone());
    Json(page)
}

async fn get_page(State(shared): State<Shared>, Path(id): Path<Uuid>) -> Reply<Page> {
    let api = shared.api();
    api.pages.iter().find(|p| p.id == id).cloned().map(Json).ok_or_else(|| missing("Page"))
}

async fn update_page(
    State(shared): State<Shared>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Reply<Page> {
    let mut api = shared.api();
    if api.fail_page_updates {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "boom" }))));
    }
    let page = api.pages.iter_mut().find(|p| p.id == id).ok_or_else(|| missing("Page"))?;
    if let Some(title) = body.get("title").and_then(Value::as_str) {
        page.title = title.to_string();
    }
    Ok(Json(page.clone()))
}

async fn archive_page(State(shared): State<Shared>, Path(id): Path<Uuid>) -> Reply<Value> {
    let mut api = shared.api();
    let page = api.pages.iter_mut().find(|p| p.id == id).ok_or_else(|| missing("Page"))?;
    page.is_archived = true;
    Ok(Json(json!({ "message": "archived" })))
}

async fn restore_page(State(shared): State<Shared>, Path(id): Path<Uuid>) -> Reply<Page> {
    let mut api = shared.api();
    let page = api.pages.iter_mut().find(|p| p.id == id).ok_or_else(|| missing("Page"))?;
    page.is_archived = false;
    Ok(Json(page.clone()))
}

async fn add_favorite(State(shared): State<Shared>, Path(id): Path<Uuid>) -> Json<Value> {
    shared.api().favorites.insert(id);
    Json(json!({ "message": "added" }))
}

async fn remove_favorite(State(shared): State<Shared>, Path(id): Path<Uuid>) -> Json<Value> {
    shared.api().favorites.remove(&id);
    Json(json!({ "message": "removed" }))
}

async fn favorite_status(State(shared): State<Shared>, Path(id): Path<Uuid>) -> Json<Value> {
    Json(json!({ "is_favorited": shared.api().favorites.contains(&id) }))
}

async fn list_blocks(State(shared): State<Shared>, Path(page_id): Path<Uuid>) -> Json<Vec<Block>> {
    let blocks: Vec<Block> =
        shared.api().blocks.iter().filter(|b| b.page_id == page_id).cloned().collect();
    // Widen the gap between a save's read and its write.
    tokio::time::sleep(Duration::from_millis(20)).await;
    Json(blocks)
}

async fn create_block(State(shared): State<Shared>, Json(body): Json<NewBlock>) -> Json<Block> {
    let block = Block {
        id: Uuid::new_v4(),
        page_id: body.page_id,
        kind: body.kind,
        content: body.content,
        parent_id: None,
        position: body.order,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    shared.api().blocks.push(block.clone());
    Json(block)
}

async fn update_block(
    State(shared): State<Shared>,
    Path(id): Path<Uuid>,
    Json(body): Json<BlockUpdate>,
) -> Reply<Block> {
    let mut api = shared.api();
    let block = api.blocks.iter_mut().find(|b| b.id == id).ok_or_else(|| missing("Block"))?;
    block.content = body.content;
    Ok(Json(block.clone()))
}

fn router(shared: Shared) -> Router {
    let api = Router::new()
        .route("/workspaces/", get(list_workspaces))
        .route("/pages/", get(list_pages).post(create_page))
        .route("/pages/trash", get(list_trash))
        .route("/pages/favorites", get(list_favorites))
        .route("/pages/{id}", get(get_page).patch(update_page).delete(archive_page))
        .route("/pages/{id}/restore", post(restore_page))
        .route(
            "/pages/{id}/favorite",
            get(favorite_status).post(add_favorite).delete(remove_favorite),
        )
        .route("/blocks/", post(create_block))
        .route("/blocks/page/{id}", get(list_blocks))
        .route("/blocks/{id}", patch(update_block));
    Router::new().nest("/api/v1", api).with_state(shared)
}

fn new_workspace(name: &str) -> Workspace {
    Workspace {
        id: Uuid::new_v4(),
        name: name.into(),
        description: None,
        icon: None,
        is_personal: true,
        owner_id: Uuid::new_v4(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn new_page(workspace_id: Uuid, title: &str, parent_id: Option<Uuid>) -> Page {
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

struct Harness {
    shared: Shared,
    base_url: String,
    task: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn start(workspaces: &[&str]) -> Self {
        let shared = Shared::default();
        shared.api().workspaces = workspaces.iter().map(|name| new_workspace(name)).collect();

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
        let addr = listener.local_addr().expect("listener should expose local address");
        let app = router(shared.clone());
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server should run");
        });

        Self { shared, base_url: format!("http://{addr}/api/v1"), task }
    }

    fn store(&self) -> WorkspaceStore<HttpRemote> {
        let remote = HttpRemote::new(&self.base_url, Some("test-token".into()))
            .expect("remote should build");
        WorkspaceStore::new(remote)
    }

    fn server_page(&self, id: Uuid) -> Page {
        self.shared.api().pages.iter().find(|p| p.id == id).cloned().expect("page on server")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ── Flows ──────────────────────────────────────────────────────────

#[tokio::test]
async fn workspace_to_nested_tree_end_to_end() {
    let harness = Harness::start(&["Personal"]).await;
    let store = harness.store();

    store.fetch_workspaces().await;
    let workspace = store.current_workspace().expect("first workspace should be selected");
    assert_eq!(workspace.name, "Personal");

    let a = store.create_page("A", None).await.expect("create A");
    let b = store.create_page("B", Some(a.id)).await.expect("create B");

    let tree = store.page_tree();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].page.id, a.id);
    assert_eq!(tree[0].children.len(), 1);
    assert_eq!(tree[0].children[0].page.id, b.id);
    assert!(tree[0].children[0].children.is_empty());

    // A fresh session sees the same shape from the server.
    let other = harness.store();
    other.fetch_workspaces().await;
    assert_eq!(other.page_tree(), tree);
}

#[tokio::test]
async fn create_without_workspace_never_reaches_server() {
    let harness = Harness::start(&[]).await;
    let store = harness.store();

    store.fetch_workspaces().await;
    assert_eq!(store.current_workspace(), None);

    assert_eq!(store.create_page("Nowhere", None).await, None);
    assert_eq!(harness.shared.api().page_creates, 0);
}

#[tokio::test]
async fn failed_update_keeps_local_pages() {
    let harness = Harness::start(&["Personal"]).await;
    let store = harness.store();
    store.fetch_workspaces().await;
    let page = store.create_page("Draft", None).await.expect("create");
    let before = store.pages();

    harness.shared.api().fail_page_updates = true;
    let error = store
        .update_page(page.id, &PageUpdate::title("Final"))
        .await
        .expect_err("update should fail");

    assert!(matches!(error, StoreError::Remote(ref e) if e.status() == Some(500)));
    assert_eq!(store.pages(), before);
    assert_eq!(harness.server_page(page.id).title, "Draft");
}

#[tokio::test]
async fn archive_and_restore_move_page_between_views() {
    let harness = Harness::start(&["Personal"]).await;
    let store = harness.store();
    store.fetch_workspaces().await;
    let page = store.create_page("Old notes", None).await.expect("create");

    store.archive_page(page.id).await.expect("archive");
    assert!(store.pages().iter().all(|p| p.id != page.id));
    assert_eq!(store.trash_pages().len(), 1);

    store.restore_page(page.id).await.expect("restore");
    assert!(store.pages().iter().any(|p| p.id == page.id));
    assert!(store.trash_pages().is_empty());
}

#[tokio::test]
async fn favorites_follow_server_state() {
    let harness = Harness::start(&["Personal"]).await;
    let store = harness.store();
    store.fetch_workspaces().await;
    let page = store.create_page("Starred", None).await.expect("create");

    store.add_favorite(page.id).await.expect("favorite");
    assert!(store.check_favorite_status(page.id).await);
    assert_eq!(store.favorites().len(), 1);

    store.remove_favorite(page.id).await.expect("unfavorite");
    assert!(store.favorites().is_empty());
}

#[tokio::test]
async fn concurrent_content_saves_produce_one_block() {
    let harness = Harness::start(&["Personal"]).await;
    let store = harness.store();
    store.fetch_workspaces().await;
    let page = store.create_page("Doc", None).await.expect("create");

    let (first, second, third) = tokio::join!(
        store.save_page_content(page.id, "<p>1</p>"),
        store.save_page_content(page.id, "<p>2</p>"),
        store.save_page_content(page.id, "<p>3</p>"),
    );
    first.expect("first save");
    second.expect("second save");
    third.expect("third save");

    let blocks = store.fetch_page_blocks(page.id).await;
    let editor_blocks: Vec<&Block> = blocks.iter().filter(|b| b.is_editor_content()).collect();
    assert_eq!(editor_blocks.len(), 1);
    assert_eq!(editor_blocks[0].editor_html(), Some("<p>3</p>"));
}

#[tokio::test]
async fn get_page_falls_back_to_server() {
    let harness = Harness::start(&["Personal"]).await;
    let store = harness.store();
    store.fetch_workspaces().await;
    let workspace = store.current_workspace().expect("selected");
    let unseen = new_page(workspace.id, "Created elsewhere", None);
    harness.shared.api().pages.push(unseen.clone());

    let fetched = store.get_page(unseen.id).await.expect("fetched remotely");
    assert_eq!(fetched.title, "Created elsewhere");
    assert!(store.pages().is_empty());

    let error = store.get_page(Uuid::new_v4()).await.expect_err("unknown page");
    assert!(matches!(error, StoreError::Remote(ref e) if e.is_not_found()));
}

#[tokio::test]
async fn page_editor_debounces_into_store() {
    let harness = Harness::start(&["Personal"]).await;
    let store = Arc::new(harness.store());
    store.fetch_workspaces().await;
    let page = store.create_page("Untitled", None).await.expect("create");

    let windows =
        EditWindows { title: Duration::from_millis(100), content: Duration::from_millis(100) };
    let mut editor = PageEditor::new(Arc::clone(&store), page.id, windows);
    for title in ["M", "Me", "Mee", "Meeting"] {
        editor.set_title(title);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(harness.server_page(page.id).title, "Meeting");
    assert_eq!(store.pages()[0].title, "Meeting");

    editor.set_content("<p>agenda</p>");
    editor.flush().await.expect("flush");
    assert_eq!(store.load_page_content(page.id).await.as_deref(), Some("<p>agenda</p>"));
}
