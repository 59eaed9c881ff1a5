// `folio mv`: reparent or reorder a page.

use clap::Args;
use serde::Serialize;
use uuid::Uuid;

use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct MvArgs {
    /// Page to move (name or id).
    pub page: String,

    /// New parent (name or id). Omit to move to the top level.
    #[arg(long, conflicts_with = "root")]
    pub parent: Option<String>,

    /// Move to the top level.
    #[arg(long)]
    pub root: bool,

    /// Position among the new siblings.
    #[arg(long, default_value_t = 0)]
    pub order: i32,
}

#[derive(Debug, Serialize)]
pub struct MoveResult {
    pub page_id: Uuid,
    pub title: String,
    pub parent: Option<MovedUnder>,
    pub order: i32,
}

#[derive(Debug, Serialize)]
pub struct MovedUnder {
    pub id: Uuid,
    pub title: String,
}

pub async fn run(ctx: &Context, args: MvArgs, format: OutputFormat) -> anyhow::Result<()> {
    // Load the live list so the move is validated against fresh state.
    ctx.live_pages().await?;
    let page = ctx.page(&args.page).await?;
    let parent = match &args.parent {
        Some(parent) if !args.root => Some(ctx.page(parent).await?),
        _ => None,
    };

    ctx.store.move_page(page.id, parent.as_ref().map(|p| p.id), args.order).await?;

    let result = MoveResult {
        page_id: page.id,
        title: page.title,
        parent: parent.map(|p| MovedUnder { id: p.id, title: p.title }),
        order: args.order,
    };
    output::print_output(format, &result, format_human)?;
    Ok(())
}

fn format_human(result: &MoveResult) -> String {
    match &result.parent {
        Some(parent) => format!("Moved {} under {}", result.title, parent.title),
        None => format!("Moved {} to the top level", result.title),
    }
}
