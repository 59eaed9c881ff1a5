// `folio ls`: list live pages of the current workspace.

use clap::Args;
use serde::Serialize;

use folio_common::types::Page;

use super::label;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct LsArgs {
    /// Only pages directly under this page (name or id).
    #[arg(long)]
    parent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LsResult {
    pub workspace: String,
    pub pages: Vec<Page>,
}

pub async fn run(ctx: &Context, args: LsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (workspace, mut pages) = ctx.live_pages().await?;
    if let Some(parent) = args.parent {
        let parent = ctx.page(&parent).await?;
        pages.retain(|page| page.parent_id == Some(parent.id));
    }

    let result = LsResult { workspace: workspace.name, pages };
    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &LsResult) -> String {
    if result.pages.is_empty() {
        return format!("No pages in {}.", result.workspace);
    }

    let mut lines = vec![format!("{} page(s) in {}", result.pages.len(), result.workspace)];
    for page in &result.pages {
        let public = if page.is_public { "  (public)" } else { "" };
        lines.push(format!("  {}  {}{public}", page.id, label(page.icon.as_deref(), &page.title)));
    }
    lines.join("\n")
}
