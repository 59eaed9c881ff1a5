// `folio rename`: change a page's title, icon or cover.

use anyhow::bail;
use clap::Args;

use folio_common::types::{Page, PageUpdate};

use super::label;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Page name or id.
    pub page: String,

    /// New title.
    pub title: Option<String>,

    /// New icon (emoji). Pass an empty string to clear it.
    #[arg(long)]
    pub icon: Option<String>,

    /// New cover image URL. Pass an empty string to clear it.
    #[arg(long)]
    pub cover: Option<String>,
}

impl RenameArgs {
    fn update(&self) -> PageUpdate {
        PageUpdate {
            title: self.title.clone(),
            icon: self.icon.as_deref().map(clearable),
            cover_image: self.cover.as_deref().map(clearable),
            ..PageUpdate::default()
        }
    }
}

fn clearable(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub async fn run(ctx: &Context, args: RenameArgs, format: OutputFormat) -> anyhow::Result<()> {
    let update = args.update();
    if update.is_empty() {
        bail!("nothing to change: pass a title, --icon or --cover");
    }

    let mut page = ctx.page(&args.page).await?;
    ctx.store.update_page(page.id, &update).await?;
    update.apply_to(&mut page);
    output::print_output(format, &page, format_human)?;
    Ok(())
}

fn format_human(page: &Page) -> String {
    format!("Updated {} [{}]", label(page.icon.as_deref(), &page.title), page.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(title: Option<&str>, icon: Option<&str>, cover: Option<&str>) -> RenameArgs {
        RenameArgs {
            page: "Draft".into(),
            title: title.map(str::to_string),
            icon: icon.map(str::to_string),
            cover: cover.map(str::to_string),
        }
    }

    #[test]
    fn title_only_update() {
        let update = args(Some("Final"), None, None).update();
        assert_eq!(update, PageUpdate::title("Final"));
    }

    #[test]
    fn empty_icon_clears_it() {
        let update = args(None, Some(""), None).update();
        assert_eq!(update.icon, Some(None));
        assert_eq!(update.title, None);
    }

    #[test]
    fn cover_is_trimmed() {
        let update = args(None, None, Some(" https://img.example.com/a.png ")).update();
        assert_eq!(update.cover_image, Some(Some("https://img.example.com/a.png".into())));
    }

    #[test]
    fn no_flags_is_empty_update() {
        assert!(args(None, None, None).update().is_empty());
    }
}
