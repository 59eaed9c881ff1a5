// `folio read`: print a page body.

use clap::Args;
use serde::Serialize;
use uuid::Uuid;

use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Page name or id.
    pub page: String,
}

#[derive(Debug, Serialize)]
pub struct ReadResult {
    pub page_id: Uuid,
    pub html: Option<String>,
}

pub async fn run(ctx: &Context, args: ReadArgs, format: OutputFormat) -> anyhow::Result<()> {
    let page = ctx.page(&args.page).await?;
    let html = ctx.store.load_page_content(page.id).await;
    if html.is_none() {
        output::print_warning(format, "EMPTY_PAGE", &format!("`{}` has no saved content", page.title));
    }

    let result = ReadResult { page_id: page.id, html };
    output::print_output(format, &result, |r| r.html.clone().unwrap_or_default())?;
    Ok(())
}
