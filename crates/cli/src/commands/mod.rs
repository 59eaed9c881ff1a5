// CLI subcommand dispatch.

use clap::Subcommand;

use crate::context::Context;
use crate::output::OutputFormat;

pub mod dup;
pub mod fav;
pub mod ls;
pub mod mv;
pub mod new;
pub mod read;
pub mod rename;
pub mod search;
pub mod show;
pub mod trash;
pub mod tree;
pub mod upload;
pub mod write;
pub mod ws;

#[derive(Subcommand)]
pub enum Command {
    /// List, select and manage workspaces
    Ws(ws::WsArgs),
    /// List live pages of the current workspace
    Ls(ls::LsArgs),
    /// Show the page hierarchy
    Tree(tree::TreeArgs),
    /// Create a page
    New(new::NewArgs),
    /// Show page metadata
    Show(show::ShowArgs),
    /// Change a page title, icon or cover
    Rename(rename::RenameArgs),
    /// Reparent or reorder a page
    Mv(mv::MvArgs),
    /// Move a page to the trash
    Archive(trash::ArchiveArgs),
    /// Bring a page back from the trash
    Restore(trash::RestoreArgs),
    /// Permanently delete a trashed page
    Purge(trash::PurgeArgs),
    /// List trashed pages
    Trash(trash::TrashArgs),
    /// Duplicate a page
    Dup(dup::DupArgs),
    /// Manage favorites
    Fav(fav::FavArgs),
    /// Print a page body
    Read(read::ReadArgs),
    /// Replace a page body from stdin
    Write(write::WriteArgs),
    /// Search pages of the current workspace
    Search(search::SearchArgs),
    /// Upload a file to the current workspace
    Upload(upload::UploadArgs),
}

pub async fn run(cmd: Command, api_url: Option<String>, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::open(api_url)?;
    match cmd {
        Command::Ws(args) => ws::run(&ctx, args, format).await,
        Command::Ls(args) => ls::run(&ctx, args, format).await,
        Command::Tree(args) => tree::run(&ctx, args, format).await,
        Command::New(args) => new::run(&ctx, args, format).await,
        Command::Show(args) => show::run(&ctx, args, format).await,
        Command::Rename(args) => rename::run(&ctx, args, format).await,
        Command::Mv(args) => mv::run(&ctx, args, format).await,
        Command::Archive(args) => trash::archive(&ctx, args, format).await,
        Command::Restore(args) => trash::restore(&ctx, args, format).await,
        Command::Purge(args) => trash::purge(&ctx, args, format).await,
        Command::Trash(args) => trash::list(&ctx, args, format).await,
        Command::Dup(args) => dup::run(&ctx, args, format).await,
        Command::Fav(args) => fav::run(&ctx, args, format).await,
        Command::Read(args) => read::run(&ctx, args, format).await,
        Command::Write(args) => write::run(&ctx, args, format).await,
        Command::Search(args) => search::run(&ctx, args, format).await,
        Command::Upload(args) => upload::run(&ctx, args, format).await,
    }
}

/// Icon-prefixed title for human output.
pub(crate) fn label(icon: Option<&str>, title: &str) -> String {
    let title = if title.trim().is_empty() { "Untitled" } else { title };
    match icon {
        Some(icon) if !icon.is_empty() => format!("{icon} {title}"),
        _ => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefixes_icon() {
        assert_eq!(label(Some("📓"), "Journal"), "📓 Journal");
        assert_eq!(label(None, "Journal"), "Journal");
        assert_eq!(label(Some(""), "Journal"), "Journal");
    }

    #[test]
    fn blank_title_reads_untitled() {
        assert_eq!(label(None, "  "), "Untitled");
    }
}
