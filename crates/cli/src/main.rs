// folio CLI entry point.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod exit_code;
mod output;

use exit_code::ExitCode;
use output::OutputFormat;

/// Log filter override, e.g. `FOLIO_LOG=folio_client=debug`.
const LOG_ENV: &str = "FOLIO_LOG";

#[derive(Parser)]
#[command(name = "folio", version, about = "Workspaces and pages from the terminal")]
struct Cli {
    /// Force JSON output.
    #[arg(long, global = true)]
    json: bool,

    /// API base URL (overrides config and FOLIO_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::detect(cli.json);
    match commands::run(cli.command, cli.api_url, format).await {
        Ok(()) => ExitCode::Success.into(),
        Err(error) => {
            output::print_anyhow_error(format, &error);
            ExitCode::from_error(&error).into()
        }
    }
}
