pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod metrics;
pub mod progress;
pub mod report;
pub mod shutdown;
pub mod source;
pub mod types;

use anyhow::Context;
use auth::{GitConfigTokenStore, TerminalPrompt};
use cli::Cli;
use config::AppConfig;
use github::GitHubClient;
use progress::ProgressMeter;
use std::io::{self, Write};

/// Runs the whole tool: resolves a token, fetches the repository's closed pull
/// requests and prints the report to stdout.
pub async fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<()> {
    let repo_id = cli.repo_id();

    let store = GitConfigTokenStore::new(config.token_config_key.clone());
    let prompt = TerminalPrompt::new();
    let token = auth::resolve_token(config.github_token.as_deref(), &store, &prompt).await?;

    let client = GitHubClient::new(Some(token), config.pr_page_size)?;
    client.ensure_repository(&repo_id).await?;
    tracing::info!(repo_id = %repo_id, "Fetching closed pull requests");

    let progress = if cli.json {
        ProgressMeter::hidden()
    } else {
        ProgressMeter::stdout()
    };

    let report = fetcher::fetch_and_build_report(
        &client,
        &repo_id,
        cli.merge_rate_formula(),
        &progress,
    )
    .await?;

    let output = if cli.json {
        format!("{}\n", report.render_json()?)
    } else {
        report.render_text(config.histogram_width)
    };

    write_output(io::stdout().lock(), &output)
}

/// Writes the report. A reader that went away early (`| head`) is not an error.
fn write_output<W: Write>(mut out: W, text: &str) -> anyhow::Result<()> {
    match out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("Stdout closed before the report was fully written");
            Ok(())
        }
        result => result.context("failed to write the report to stdout"),
    }
}
