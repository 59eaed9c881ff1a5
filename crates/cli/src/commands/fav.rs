// `folio fav`: list and toggle favorites.

use clap::{Args, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use folio_client::store::ledger;
use folio_common::types::Page;

use super::label;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct FavArgs {
    #[command(subcommand)]
    command: FavCommand,
}

#[derive(Debug, Subcommand)]
enum FavCommand {
    /// List favorite pages
    List,
    /// Mark a page as favorite
    Add {
        /// Page name or id.
        page: String,
    },
    /// Unmark a favorite page
    Rm {
        /// Page name or id.
        page: String,
    },
    /// Check whether a page is a favorite
    Status {
        /// Page name or id.
        page: String,
    },
}

#[derive(Debug, Serialize)]
pub struct FavoriteState {
    pub page_id: Uuid,
    pub title: String,
    pub is_favorited: bool,
}

pub async fn run(ctx: &Context, args: FavArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        FavCommand::List => {
            ctx.store.fetch_favorites().await;
            ctx.check_refresh()?;
            let all = ctx.store.favorites();
            let favorites: Vec<Page> =
                ledger::live_favorites(&all).into_iter().cloned().collect();
            output::print_output(format, &favorites, format_list)?;
        }
        FavCommand::Add { page } => {
            let page = ctx.page(&page).await?;
            ctx.store.add_favorite(page.id).await?;
            print_state(format, &page, true)?;
        }
        FavCommand::Rm { page } => {
            let page = ctx.page(&page).await?;
            ctx.store.remove_favorite(page.id).await?;
            print_state(format, &page, false)?;
        }
        FavCommand::Status { page } => {
            let page = ctx.page(&page).await?;
            let is_favorited = ctx.store.check_favorite_status(page.id).await;
            print_state(format, &page, is_favorited)?;
        }
    }
    Ok(())
}

fn print_state(format: OutputFormat, page: &Page, is_favorited: bool) -> std::io::Result<()> {
    let state = FavoriteState { page_id: page.id, title: page.title.clone(), is_favorited };
    output::print_output(format, &state, format_state)
}

fn format_state(state: &FavoriteState) -> String {
    if state.is_favorited {
        format!("★ {} is a favorite", state.title)
    } else {
        format!("☆ {} is not a favorite", state.title)
    }
}

fn format_list(favorites: &Vec<Page>) -> String {
    if favorites.is_empty() {
        return "No favorites yet. Run: folio fav add <page>".into();
    }
    favorites
        .iter()
        .map(|page| format!("★ {}  [{}]", label(page.icon.as_deref(), &page.title), page.id))
        .collect::<Vec<_>>()
        .join("\n")
}
