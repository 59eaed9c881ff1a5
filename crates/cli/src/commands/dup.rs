// `folio dup`: duplicate a page.

use anyhow::Context as _;
use clap::Args;

use folio_common::types::Page;

use super::label;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct DupArgs {
    /// Page name or id.
    pub page: String,
}

pub async fn run(ctx: &Context, args: DupArgs, format: OutputFormat) -> anyhow::Result<()> {
    let page = ctx.page(&args.page).await?;
    let copy = ctx
        .store
        .duplicate_page(page.id)
        .await
        .with_context(|| format!("failed to duplicate `{}`", page.title))?;
    output::print_output(format, &copy, format_human)?;
    Ok(())
}

fn format_human(copy: &Page) -> String {
    format!("Duplicated as {} [{}]", label(copy.icon.as_deref(), &copy.title), copy.id)
}
