// Page tree builder: flat page records → parent/child forest.
//
// Pure structural transform. Pages are indexed by id once, then bucketed
// under their parent in a single pass, so building is O(n). Archived pages
// are NOT filtered here; callers pass `live_pages(..)` when they want the
// sidebar view.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::types::Page;

/// A page together with its nested children. Only produced by
/// [`build_tree`]; the flat [`Page`] record has no children field.
///
/// Traversal, cloning and dropping use an explicit stack, so nesting depth
/// is bounded by memory, not by the thread stack.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PageNode {
    #[serde(flatten)]
    pub page: Page,
    pub children: Vec<PageNode>,
}

impl PageNode {
    fn leaf(page: Page, capacity: usize) -> Self {
        Self { page, children: Vec::with_capacity(capacity) }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(&node.children);
        }
        count
    }

    /// Depth-first (pre-order) walk yielding `(depth, page)`.
    pub fn flatten(&self) -> Vec<(usize, &Page)> {
        let mut out = Vec::new();
        let mut stack = vec![(0, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, &node.page));
            stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        }
        out
    }

    pub fn find(&self, id: Uuid) -> Option<&PageNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.page.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }
}

impl Clone for PageNode {
    fn clone(&self) -> Self {
        // Rebuild from the pre-order walk: `open` holds the current path.
        let mut open: Vec<PageNode> = Vec::new();
        for (depth, page) in self.flatten() {
            while open.len() > depth {
                close_last(&mut open);
            }
            open.push(PageNode::leaf(page.clone(), 0));
        }
        while open.len() > 1 {
            close_last(&mut open);
        }
        open.pop().unwrap_or_else(|| PageNode::leaf(self.page.clone(), 0))
    }
}

impl Drop for PageNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Pop the innermost open node and attach it to its parent.
fn close_last(open: &mut Vec<PageNode>) {
    if let Some(node) = open.pop() {
        if let Some(parent) = open.last_mut() {
            parent.children.push(node);
        }
    }
}

/// Total node count of a forest.
pub fn forest_size(forest: &[PageNode]) -> usize {
    forest.iter().map(PageNode::count).sum()
}

/// Pages that belong in the live tree (not archived), in input order.
pub fn live_pages(pages: &[Page]) -> Vec<Page> {
    pages.iter().filter(|page| !page.is_archived).cloned().collect()
}

/// Build the forest of root pages with nested children.
///
/// Roots are pages without a `parent_id`, or whose parent is not in
/// `pages`. Children keep the relative order they had in the input. A page
/// is never dropped: if the input is malformed and contains a parent cycle,
/// the first page of the cycle (in input order) is promoted to a root.
pub fn build_tree(pages: &[Page]) -> Vec<PageNode> {
    let index: HashMap<Uuid, usize> =
        pages.iter().enumerate().map(|(position, page)| (page.id, position)).collect();

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); pages.len()];
    let mut roots = Vec::new();

    for (position, page) in pages.iter().enumerate() {
        match page.parent_id.and_then(|parent| index.get(&parent).copied()) {
            Some(parent) if parent != position => buckets[parent].push(position),
            _ => roots.push(position),
        }
    }

    let mut visited = vec![false; pages.len()];
    let mut forest: Vec<PageNode> = Vec::with_capacity(roots.len());
    for root in roots {
        forest.extend(assemble(root, pages, &buckets, &mut visited));
    }

    for position in 0..pages.len() {
        if !visited[position] {
            forest.extend(assemble(position, pages, &buckets, &mut visited));
        }
    }

    forest
}

/// Partially built node: children are filled in as the walk returns to it.
struct Frame {
    position: usize,
    next_child: usize,
    node: PageNode,
}

/// Build the subtree under `top` post-order with an explicit stack. Pages
/// already placed elsewhere are skipped, which is what breaks cycles.
fn assemble(
    top: usize,
    pages: &[Page],
    buckets: &[Vec<usize>],
    visited: &mut [bool],
) -> Option<PageNode> {
    let frame = |position: usize| Frame {
        position,
        next_child: 0,
        node: PageNode::leaf(pages[position].clone(), buckets[position].len()),
    };

    visited[top] = true;
    let mut stack = vec![frame(top)];
    while let Some(current) = stack.last_mut() {
        if let Some(&child) = buckets[current.position].get(current.next_child) {
            current.next_child += 1;
            if !visited[child] {
                visited[child] = true;
                stack.push(frame(child));
            }
            continue;
        }

        let done = stack.pop()?;
        match stack.last_mut() {
            Some(parent) => parent.node.children.push(done.node),
            None => return Some(done.node),
        }
    }
    None
}

/// Ids of every page below `id` (children, grandchildren, …).
pub fn descendants(pages: &[Page], id: Uuid) -> HashSet<Uuid> {
    let mut by_parent: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for page in pages {
        if let Some(parent) = page.parent_id {
            by_parent.entry(parent).or_default().push(page.id);
        }
    }

    let mut found = HashSet::new();
    let mut queue = VecDeque::from([id]);
    while let Some(current) = queue.pop_front() {
        for &child in by_parent.get(&current).into_iter().flatten() {
            if child != id && found.insert(child) {
                queue.push_back(child);
            }
        }
    }
    found
}

// ── Move validation ────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("page {0} is not in the live page list")]
    UnknownPage(Uuid),

    #[error("parent {0} is not a live page")]
    UnknownParent(Uuid),

    #[error("a page cannot be its own parent")]
    SelfParent,

    #[error("cannot move page {page} under its descendant {parent}")]
    IntoDescendant { page: Uuid, parent: Uuid },

    #[error("parent {parent} belongs to another workspace")]
    CrossWorkspace { parent: Uuid },
}

/// Check that reparenting `page_id` under `new_parent` keeps the pages a
/// forest within one workspace.
pub fn validate_move(
    pages: &[Page],
    page_id: Uuid,
    new_parent: Option<Uuid>,
) -> Result<(), MoveError> {
    let page = pages
        .iter()
        .find(|page| page.id == page_id && !page.is_archived)
        .ok_or(MoveError::UnknownPage(page_id))?;

    let Some(parent_id) = new_parent else {
        return Ok(());
    };

    if parent_id == page_id {
        return Err(MoveError::SelfParent);
    }

    let parent = pages
        .iter()
        .find(|candidate| candidate.id == parent_id && !candidate.is_archived)
        .ok_or(MoveError::UnknownParent(parent_id))?;

    if parent.workspace_id != page.workspace_id {
        return Err(MoveError::CrossWorkspace { parent: parent_id });
    }

    if descendants(pages, page_id).contains(&parent_id) {
        return Err(MoveError::IntoDescendant { page: page_id, parent: parent_id });
    }

    Ok(())
}
