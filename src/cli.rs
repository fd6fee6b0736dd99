use crate::config::RepoId;
use crate::metrics::MergeRateFormula;
use clap::Parser;

/// Statistics about a GitHub repository's closed pull requests
#[derive(Parser, Debug, Clone)]
#[command(name = "github-pr-stats", version, long_about = None)]
pub struct Cli {
    /// User or organization that owns the repository
    pub owner: String,

    /// Name of the repository
    pub repo: String,

    /// Print the report as JSON instead of text histograms
    #[arg(long)]
    pub json: bool,

    /// Compute the merge percentage as `100 - total / merged`, like older releases did
    #[arg(long)]
    pub legacy_merge_rate: bool,

    /// Enable verbose logging on stderr (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The repository to analyze. `..` is stripped from both parts so they
    /// cannot walk out of the API path they are joined into.
    pub fn repo_id(&self) -> RepoId {
        RepoId::new(
            self.owner.trim().replace("..", ""),
            self.repo.trim().replace("..", ""),
        )
    }

    pub fn merge_rate_formula(&self) -> MergeRateFormula {
        if self.legacy_merge_rate {
            MergeRateFormula::Legacy
        } else {
            MergeRateFormula::Corrected
        }
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "github_pr_stats=warn",
            1 => "github_pr_stats=debug",
            _ => "github_pr_stats=trace,octocrab=debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_owner_and_repo() {
        let cli = Cli::try_parse_from(["github-pr-stats", "rust-lang", "rust"]).unwrap();

        assert_eq!(cli.repo_id(), RepoId::new("rust-lang", "rust"));
        assert!(!cli.json);
        assert_eq!(cli.merge_rate_formula(), MergeRateFormula::Corrected);
        assert_eq!(cli.log_filter(), "github_pr_stats=warn");
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "github-pr-stats",
            "--json",
            "--legacy-merge-rate",
            "-vv",
            "owner",
            "repo",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.merge_rate_formula(), MergeRateFormula::Legacy);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_repo_id_strips_parent_segments() {
        let cli = Cli::try_parse_from(["github-pr-stats", " ../evil ", "repo/.."]).unwrap();

        assert_eq!(cli.repo_id(), RepoId::new("/evil", "repo/"));
    }

    #[test]
    fn test_missing_repo_is_an_error() {
        let err = Cli::try_parse_from(["github-pr-stats", "owner"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = Cli::try_parse_from(["github-pr-stats", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }
}
