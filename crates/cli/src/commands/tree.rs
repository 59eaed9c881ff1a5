// `folio tree`: show the page hierarchy of the current workspace.

use anyhow::bail;
use clap::Args;
use serde::Serialize;

use folio_common::tree::{forest_size, PageNode};
use folio_common::types::Page;

use super::label;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Show only the subtree rooted at this page (name or id).
    pub root: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TreeResult {
    pub workspace: String,
    pub pages: Vec<PageNode>,
}

pub async fn run(ctx: &Context, args: TreeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (workspace, _) = ctx.live_pages().await?;
    let mut forest = ctx.store.page_tree();
    if let Some(root) = args.root {
        let root = ctx.page(&root).await?;
        forest = vec![subtree(&forest, &root)?];
    }

    let result = TreeResult { workspace: workspace.name, pages: forest };
    output::print_output(format, &result, format_human)?;
    Ok(())
}

/// The subtree rooted at `root`, which must be part of the live forest.
fn subtree(forest: &[PageNode], root: &Page) -> anyhow::Result<PageNode> {
    match forest.iter().find_map(|node| node.find(root.id)) {
        Some(node) => Ok(node.clone()),
        None if root.is_archived => {
            bail!("`{}` is in the trash. Run: folio restore {}", root.title, root.id)
        }
        None => bail!("`{}` is not in the live page tree", root.title),
    }
}

fn format_human(result: &TreeResult) -> String {
    let mut lines = vec![format!("{} ({} pages)", result.workspace, forest_size(&result.pages))];
    for node in &result.pages {
        for (depth, page) in node.flatten() {
            let indent = "  ".repeat(depth);
            let prefix = if depth == 0 { "" } else { "├─ " };
            lines.push(format!(
                "{indent}{prefix}{} [{}]",
                label(page.icon.as_deref(), &page.title),
                page.id
            ));
        }
    }
    lines.join("\n")
}
