// Favorites / trash views.
//
// Both views are fetched wholesale from the remote (ordering, limits and
// retention are server decisions) and cached independently of the live page
// list. The helpers here only filter what was fetched.

use uuid::Uuid;

use folio_common::types::Page;

/// Trash entries whose title contains `query`, case-insensitively.
/// An empty or blank query keeps everything.
pub fn filter_trash<'a>(trash: &'a [Page], query: &str) -> Vec<&'a Page> {
    let needle = query.trim().to_lowercase();
    trash
        .iter()
        .filter(|page| needle.is_empty() || page.title.to_lowercase().contains(&needle))
        .collect()
}

/// Favorites that are still live. Archived pages never show as favorites,
/// even if the last fetched view still lists them.
pub fn live_favorites(favorites: &[Page]) -> Vec<&Page> {
    favorites.iter().filter(|page| !page.is_archived).collect()
}

/// Membership check against the cached favorites view.
pub fn is_locally_favorited(favorites: &[Page], page_id: Uuid) -> bool {
    favorites.iter().any(|page| page.id == page_id && !page.is_archived)
}
