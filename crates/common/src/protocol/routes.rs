// REST route builders for the remote authority.
//
// Paths are relative to the API base URL and keep the server's trailing
// slash on collection routes.

use uuid::Uuid;

/// Query parameter naming the workspace on page list routes.
pub const WORKSPACE_ID_PARAM: &str = "workspace_id";

// ── Workspaces ─────────────────────────────────────────────────────
pub const WORKSPACES: &str = "/workspaces/";

pub fn workspace(id: Uuid) -> String {
    format!("/workspaces/{id}")
}

// ── Pages ──────────────────────────────────────────────────────────
pub const PAGES: &str = "/pages/";
pub const PAGES_TRASH: &str = "/pages/trash";
pub const PAGES_FAVORITES: &str = "/pages/favorites";

pub fn page(id: Uuid) -> String {
    format!("/pages/{id}")
}

pub fn page_favorite(id: Uuid) -> String {
    format!("/pages/{id}/favorite")
}

pub fn page_restore(id: Uuid) -> String {
    format!("/pages/{id}/restore")
}

pub fn page_permanent(id: Uuid) -> String {
    format!("/pages/{id}/permanent")
}

pub fn page_duplicate(id: Uuid) -> String {
    format!("/pages/{id}/duplicate")
}

pub fn page_move(id: Uuid) -> String {
    format!("/pages/{id}/move")
}

// ── Blocks ─────────────────────────────────────────────────────────
pub const BLOCKS: &str = "/blocks/";

pub fn page_blocks(page_id: Uuid) -> String {
    format!("/blocks/page/{page_id}")
}

pub fn block(id: Uuid) -> String {
    format!("/blocks/{id}")
}

// ── Search ─────────────────────────────────────────────────────────
pub const SEARCH: &str = "/search/";

// ── Files ──────────────────────────────────────────────────────────
pub const FILES_UPLOAD: &str = "/files/upload";
