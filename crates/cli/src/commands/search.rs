// `folio search`: full-text search in the current workspace.

use anyhow::bail;
use clap::Args;
use serde::Serialize;

use folio_common::types::{MatchedIn, SearchHit};

use super::label;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Words to search for.
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Maximum number of pages to return (1-100).
    #[arg(long, short = 'n', default_value_t = 10)]
    pub limit: u32,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub workspace: String,
    pub query: String,
    pub hits: Vec<SearchHit>,
}

pub async fn run(ctx: &Context, args: SearchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let query = args.query.join(" ");
    if query.trim().is_empty() {
        bail!("search query is empty");
    }
    let workspace = ctx.workspace().await?;
    let hits = ctx.store.search(&query, args.limit).await;

    let result = SearchResult { workspace: workspace.name, query, hits };
    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &SearchResult) -> String {
    if result.hits.is_empty() {
        return format!("No pages in {} match \"{}\".", result.workspace, result.query);
    }

    let mut lines = Vec::with_capacity(result.hits.len() * 2);
    for hit in &result.hits {
        lines.push(format!(
            "{}  [{}]",
            label(hit.page_icon.as_deref(), &hit.page_title),
            hit.page_id
        ));
        if hit.matched_in == MatchedIn::Content {
            let snippet = hit
                .matched_blocks
                .first()
                .map(|block| block.highlight.as_str())
                .unwrap_or(hit.highlight.as_str());
            lines.push(format!("    {}", strip_marks(snippet)));
        }
    }
    lines.join("\n")
}

/// Drop the `<mark>` tags the server wraps around matched terms.
fn strip_marks(snippet: &str) -> String {
    snippet.replace("<mark>", "").replace("</mark>", "")
}
