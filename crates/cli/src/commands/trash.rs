// `folio archive | restore | purge | trash`: soft delete and the trash view.

use anyhow::bail;
use clap::Args;
use serde::Serialize;
use uuid::Uuid;

use folio_client::store::ledger;
use folio_common::types::Page;

use super::label;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ArchiveArgs {
    /// Page name or id.
    pub page: String,
}

#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Trashed page title or id.
    pub page: String,
}

#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Trashed page title or id.
    pub page: String,

    /// Confirm the permanent deletion.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct TrashArgs {
    /// Only show pages whose title contains this text (case-insensitive).
    #[arg(long, short)]
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PageAction {
    pub action: &'static str,
    pub page_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TrashResult {
    pub filter: Option<String>,
    pub pages: Vec<Page>,
}

pub async fn archive(ctx: &Context, args: ArchiveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let page = ctx.page(&args.page).await?;
    ctx.store.archive_page(page.id).await?;
    let action = PageAction { action: "archived", page_id: page.id };
    output::print_output(format, &action, |_| {
        format!("Moved {} to the trash", label(page.icon.as_deref(), &page.title))
    })?;
    Ok(())
}

pub async fn restore(ctx: &Context, args: RestoreArgs, format: OutputFormat) -> anyhow::Result<()> {
    let page_id = ctx.trashed_page_id(&args.page).await?;
    ctx.store.restore_page(page_id).await?;
    let action = PageAction { action: "restored", page_id };
    output::print_output(format, &action, format_action)?;
    Ok(())
}

pub async fn purge(ctx: &Context, args: PurgeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let page_id = ctx.trashed_page_id(&args.page).await?;
    if !args.yes {
        bail!("refusing to permanently delete {page_id} without --yes");
    }
    ctx.store.delete_page(page_id).await?;
    let action = PageAction { action: "deleted", page_id };
    output::print_output(format, &action, format_action)?;
    Ok(())
}

pub async fn list(ctx: &Context, args: TrashArgs, format: OutputFormat) -> anyhow::Result<()> {
    let trash = ctx.trash().await?;
    let query = args.filter.unwrap_or_default();
    let pages = ledger::filter_trash(&trash, &query).into_iter().cloned().collect();
    let filter = (!query.trim().is_empty()).then_some(query);

    let result = TrashResult { filter, pages };
    output::print_output(format, &result, format_trash)?;
    Ok(())
}

fn format_action(action: &PageAction) -> String {
    format!("Page {} {}", action.page_id, action.action)
}

fn format_trash(result: &TrashResult) -> String {
    if result.pages.is_empty() {
        return match &result.filter {
            Some(filter) => format!("No trashed pages match \"{filter}\"."),
            None => "Trash is empty.".into(),
        };
    }

    let mut lines = vec![format!("{} page(s) in trash", result.pages.len())];
    for page in &result.pages {
        lines.push(format!(
            "  {}  {}  (archived {})",
            page.id,
            label(page.icon.as_deref(), &page.title),
            page.updated_at.format("%Y-%m-%d")
        ));
    }
    lines.join("\n")
}
