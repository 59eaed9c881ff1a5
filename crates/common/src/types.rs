// Core domain types shared across all Folio crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Key under which the editor stores its serialized body in an
/// `editor_content` block.
pub const EDITOR_CONTENT_KEY: &str = "html";

/// A workspace is the top-level container for a set of pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_personal: bool,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A titled document node. Hierarchy is expressed through `parent_id`;
/// the nested view is built separately as [`crate::tree::PageNode`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Soft-deleted ("in trash").
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub public_slug: Option<String>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Block kinds the editor knows about. Anything else the server sends is
/// kept as `Unknown` so a block list never fails to decode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Paragraph,
    #[serde(rename = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    Heading3,
    BulletedList,
    NumberedList,
    Code,
    Quote,
    Divider,
    /// Canonical holder of a page's rich-text body.
    EditorContent,
    #[serde(other)]
    Unknown,
}

/// An atomic content unit attached to a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub id: Uuid,
    pub page_id: Uuid,
    #[serde(rename = "type")]
    pub kind: BlockType,
    #[serde(default)]
    pub content: Map<String, Value>,
    #[serde(default, alias = "parent_block_id")]
    pub parent_id: Option<Uuid>,
    #[serde(default, alias = "order")]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Block {
    pub fn is_editor_content(&self) -> bool {
        self.kind == BlockType::EditorContent
    }

    /// Serialized editor body, if this block carries one.
    pub fn editor_html(&self) -> Option<&str> {
        if !self.is_editor_content() {
            return None;
        }
        self.content.get(EDITOR_CONTENT_KEY).and_then(Value::as_str)
    }
}

/// Build the content payload of an `editor_content` block.
pub fn editor_content_payload(html: &str) -> Map<String, Value> {
    let mut content = Map::new();
    content.insert(EDITOR_CONTENT_KEY.to_string(), Value::String(html.to_string()));
    content
}

/// Response of the favorite status endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteStatus {
    pub is_favorited: bool,
}

/// Response of the upload endpoint. Only the locator is relied upon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub filename: Option<String>,
    pub storage_url: String,
}

/// Binary content to upload. Never serialized; sent as multipart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

// ── Request bodies ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewWorkspace {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Partial workspace update. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct WorkspaceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Option<String>>,
}

impl WorkspaceUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none()
    }

    /// Shallow-merge the present fields into `workspace`.
    pub fn apply_to(&self, workspace: &mut Workspace) {
        if let Some(name) = &self.name {
            workspace.name = name.clone();
        }
        if let Some(icon) = &self.icon {
            workspace.icon = icon.clone();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPage {
    pub workspace_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

/// Partial page update (PATCH body). Absent fields are left untouched by
/// the server; `Some(None)` on a nullable field clears it.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_slug: Option<Option<String>>,
}

impl PageUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Self::default() }
    }

    pub fn icon(icon: Option<String>) -> Self {
        Self { icon: Some(icon), ..Self::default() }
    }

    pub fn cover_image(cover_image: Option<String>) -> Self {
        Self { cover_image: Some(cover_image), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.icon.is_none()
            && self.cover_image.is_none()
            && self.is_public.is_none()
            && self.public_slug.is_none()
    }

    /// Shallow-merge the present fields into `page`.
    pub fn apply_to(&self, page: &mut Page) {
        if let Some(title) = &self.title {
            page.title = title.clone();
        }
        if let Some(icon) = &self.icon {
            page.icon = icon.clone();
        }
        if let Some(cover_image) = &self.cover_image {
            page.cover_image = cover_image.clone();
        }
        if let Some(is_public) = self.is_public {
            page.is_public = is_public;
        }
        if let Some(public_slug) = &self.public_slug {
            page.public_slug = public_slug.clone();
        }
    }
}

/// Reparent / reorder request. A `None` parent moves the page to the root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMove {
    pub new_parent_id: Option<Uuid>,
    pub new_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBlock {
    pub page_id: Uuid,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub content: Map<String, Value>,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockUpdate {
    pub content: Map<String, Value>,
}

// ── Search ─────────────────────────────────────────────────────────

/// Full-text search request, scoped to one workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub workspace_id: Uuid,
    pub limit: u32,
}

/// Where a search hit matched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchedIn {
    Title,
    Content,
}

/// A block whose text matched the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchBlockHit {
    pub block_id: Uuid,
    pub page_id: Uuid,
    #[serde(default)]
    pub block_type: String,
    #[serde(default)]
    pub content_text: String,
    /// Snippet with `<mark>` around the matched terms.
    #[serde(default)]
    pub highlight: String,
    #[serde(default)]
    pub rank: f64,
}

/// One page in the search results, best match first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub page_id: Uuid,
    pub page_title: String,
    #[serde(default)]
    pub page_icon: Option<String>,
    #[serde(default)]
    pub highlight: String,
    #[serde(default)]
    pub rank: f64,
    pub matched_in: MatchedIn,
    #[serde(default)]
    pub matched_blocks: Vec<SearchBlockHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub total: usize,
}
