// `folio write`: replace a page body from stdin or a file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

use folio_client::PageEditor;

use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct WriteArgs {
    /// Page name or id.
    pub page: String,

    /// Read the body from this file instead of stdin.
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Also set the page title.
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WriteResult {
    pub page_id: Uuid,
    pub bytes: usize,
    pub title: Option<String>,
}

pub async fn run(ctx: &Context, args: WriteArgs, format: OutputFormat) -> anyhow::Result<()> {
    let page = ctx.page(&args.page).await?;
    let html = match &args.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await.context("failed to read stdin")?;
            buf
        }
    };
    if html.trim().is_empty() {
        output::print_warning(format, "EMPTY_INPUT", "writing an empty body");
    }

    let mut editor = PageEditor::new(Arc::clone(&ctx.store), page.id, ctx.edit_windows());
    if let Some(title) = &args.title {
        editor.set_title(title.clone());
    }
    editor.set_content(html.clone());
    editor.flush().await?;

    let result = WriteResult { page_id: page.id, bytes: html.len(), title: args.title };
    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &WriteResult) -> String {
    match &result.title {
        Some(title) => format!("Saved {} bytes to {title} [{}]", result.bytes, result.page_id),
        None => format!("Saved {} bytes to {}", result.bytes, result.page_id),
    }
}
