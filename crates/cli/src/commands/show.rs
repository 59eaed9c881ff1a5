// `folio show`: page metadata, favorite flag and block count.

use clap::Args;
use serde::Serialize;

use folio_common::types::Page;

use super::label;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Page name or id.
    pub page: String,
}

#[derive(Debug, Serialize)]
pub struct ShowResult {
    #[serde(flatten)]
    pub page: Page,
    pub is_favorited: bool,
    pub blocks: usize,
}

pub async fn run(ctx: &Context, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let page = ctx.page(&args.page).await?;
    let (is_favorited, blocks) = tokio::join!(
        ctx.store.check_favorite_status(page.id),
        ctx.store.fetch_page_blocks(page.id),
    );

    let result = ShowResult { page, is_favorited, blocks: blocks.len() };
    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &ShowResult) -> String {
    let page = &result.page;
    let star = if result.is_favorited { " ★" } else { "" };
    let mut lines = vec![format!("{}{star}", label(page.icon.as_deref(), &page.title))];
    lines.push(format!("  id:       {}", page.id));
    if let Some(parent) = page.parent_id {
        lines.push(format!("  parent:   {parent}"));
    }
    if page.is_archived {
        lines.push("  status:   in trash".into());
    }
    match (page.is_public, page.public_slug.as_deref()) {
        (true, Some(slug)) => lines.push(format!("  public:   /{slug}")),
        (true, None) => lines.push("  public:   yes".into()),
        (false, _) => {}
    }
    if let Some(cover) = &page.cover_image {
        lines.push(format!("  cover:    {cover}"));
    }
    lines.push(format!("  blocks:   {}", result.blocks));
    lines.push(format!("  updated:  {}", page.updated_at.format("%Y-%m-%d %H:%M")));
    lines.join("\n")
}
