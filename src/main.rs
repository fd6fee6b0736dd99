use clap::Parser;
use github_pr_stats::cli::Cli;
use github_pr_stats::config::AppConfig;
use github_pr_stats::shutdown::{self, Outcome};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the process environment still applies.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing (logging) on stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            eprintln!("error: invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let run = github_pr_stats::run(&cli, &config);
    match shutdown::until_interrupted(run, shutdown::interrupt_signal()).await {
        Outcome::Completed(Ok(())) => ExitCode::SUCCESS,
        Outcome::Completed(Err(e)) => {
            tracing::debug!("Run failed: {:?}", e);
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
        Outcome::Interrupted => {
            // Nothing is printed on interrupt; just leave the terminal on a fresh line.
            let mut stdout = io::stdout();
            let _ = writeln!(stdout);
            let _ = stdout.flush();
            // A token prompt may still be blocked reading the terminal, so the
            // runtime is not waited on.
            std::process::exit(0);
        }
    }
}
