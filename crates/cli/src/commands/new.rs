// `folio new`: create a page in the current workspace.

use anyhow::Context as _;
use clap::Args;

use folio_common::types::Page;

use super::label;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Page title.
    #[arg(default_value = "Untitled")]
    pub title: String,

    /// Create under this page (name or id).
    #[arg(long)]
    pub parent: Option<String>,
}

pub async fn run(ctx: &Context, args: NewArgs, format: OutputFormat) -> anyhow::Result<()> {
    ctx.workspace().await?;
    let parent_id = match &args.parent {
        Some(parent) => Some(ctx.page(parent).await?.id),
        None => None,
    };

    let page = ctx
        .store
        .create_page(&args.title, parent_id)
        .await
        .with_context(|| format!("failed to create page `{}`", args.title))?;
    output::print_output(format, &page, format_human)?;
    Ok(())
}

fn format_human(page: &Page) -> String {
    format!("Created {} [{}]", label(page.icon.as_deref(), &page.title), page.id)
}
