// `folio upload`: upload a file to the current workspace.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use clap::Args;
use serde::Serialize;

use folio_common::types::FileUpload;

use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// File to upload.
    pub path: PathBuf,

    /// Attach the file to this page (name or id).
    #[arg(long)]
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub file_name: String,
    pub storage_url: String,
}

pub async fn run(ctx: &Context, args: UploadArgs, format: OutputFormat) -> anyhow::Result<()> {
    let workspace = ctx.workspace().await?;
    let page_id = match &args.page {
        Some(reference) => Some(ctx.page(reference).await?.id),
        None => None,
    };

    let bytes = tokio::fs::read(&args.path)
        .await
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    let file_name = args
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("path has no file name")?;
    let file = FileUpload { mime_type: mime_type(&args.path).map(str::to_string), file_name, bytes };

    let Some(storage_url) = ctx.store.upload_file(&file, workspace.id, page_id).await else {
        bail!("upload of {} failed", file.file_name);
    };
    let result = UploadResult { file_name: file.file_name, storage_url };
    output::print_output(format, &result, |r| r.storage_url.clone())?;
    Ok(())
}

fn mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "csv" => "text/csv",
        _ => return None,
    };
    Some(mime)
}
