// `folio ws`: list, select and manage workspaces.

use anyhow::bail;
use clap::{Args, Subcommand};
use serde::Serialize;

use folio_common::types::{Workspace, WorkspaceUpdate};

use super::label;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct WsArgs {
    #[command(subcommand)]
    command: WsCommand,
}

#[derive(Debug, Subcommand)]
enum WsCommand {
    /// List workspaces and mark the selected one
    List,
    /// Select the workspace later commands operate on
    Use {
        /// Workspace name or id.
        workspace: String,
    },
    /// Create a workspace
    Create {
        name: String,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Rename a workspace
    Rename {
        /// Workspace name or id.
        workspace: String,
        name: String,
    },
    /// Delete a workspace and everything in it
    Rm {
        /// Workspace name or id.
        workspace: String,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct WorkspaceList {
    pub current: Option<String>,
    pub workspaces: Vec<Workspace>,
}

pub async fn run(ctx: &Context, args: WsArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        WsCommand::List => {
            let workspaces = ctx.refresh_workspaces().await?;
            let current = ctx.store.current_workspace().map(|w| w.id.to_string());
            let list = WorkspaceList { current, workspaces };
            output::print_output(format, &list, format_list)?;
        }
        WsCommand::Use { workspace } => {
            let workspace = ctx.workspace_ref(&workspace).await?;
            ctx.store.select_workspace(workspace.id).await;
            ctx.check_refresh()?;
            output::print_output(format, &workspace, |w| {
                format!("Now using {}", label(w.icon.as_deref(), &w.name))
            })?;
        }
        WsCommand::Create { name, icon } => {
            let workspace = ctx.store.create_workspace(&name, icon).await?;
            output::print_output(format, &workspace, |w| {
                format!("Created workspace {} [{}]", label(w.icon.as_deref(), &w.name), w.id)
            })?;
        }
        WsCommand::Rename { workspace, name } => {
            let mut workspace = ctx.workspace_ref(&workspace).await?;
            let update = WorkspaceUpdate { name: Some(name), icon: None };
            ctx.store.update_workspace(workspace.id, &update).await?;
            update.apply_to(&mut workspace);
            output::print_output(format, &workspace, |w| format!("Renamed to {}", w.name))?;
        }
        WsCommand::Rm { workspace, yes } => {
            let workspace = ctx.workspace_ref(&workspace).await?;
            if !yes {
                bail!("refusing to delete workspace `{}` without --yes", workspace.name);
            }
            ctx.store.delete_workspace(workspace.id).await?;
            output::print_output(format, &workspace, |w| format!("Deleted workspace {}", w.name))?;
        }
    }
    Ok(())
}

fn format_list(list: &WorkspaceList) -> String {
    if list.workspaces.is_empty() {
        return "No workspaces. Run: folio ws create <name>".into();
    }

    let current = list.current.as_deref();
    list.workspaces
        .iter()
        .map(|w| {
            let marker = if current == Some(w.id.to_string().as_str()) { "*" } else { " " };
            let personal = if w.is_personal { " (personal)" } else { "" };
            format!("{marker} {}{personal}  [{}]", label(w.icon.as_deref(), &w.name), w.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
