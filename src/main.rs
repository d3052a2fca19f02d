mod client;
mod config;
mod error;
mod github;
mod release;
mod workflow;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::client::FsAssetSource;
use crate::github::GitHubReleases;
use crate::release::{Release, release_name_for_tag};
use crate::workflow::{WorkflowParameters, perform_release_workflow};

#[derive(Parser, Debug)]
#[command(
    name = "readysteady",
    version,
    about = "Create a draft GitHub release for a tag",
    long_about = None
)]
struct Cli {
    /// Repository owner (user or organization)
    #[arg(long)]
    owner: Option<String>,

    /// Repository name
    #[arg(long)]
    repo: Option<String>,

    /// Tag to release, e.g. v1.2.0; the release is named after it without the first character
    #[arg(long)]
    tag: String,

    /// Delete an existing draft release with the same name and create a new one
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Files to upload to the draft release
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Abort when the tag lookup fails for any reason other than "not found"
    #[arg(long = "strict-tag-check", default_value_t = false)]
    strict_tag_check: bool,

    /// Log debug output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(release) => {
            println!("\nDraft release successfully created 🎉");
            println!("You can edit the release here: {}\n", release.edit_url());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "readysteady=debug"
    } else {
        "readysteady=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<Release> {
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let cfg = config::load_config(&cwd).await?;

    let owner = cli
        .owner
        .or_else(|| cfg.owner.clone())
        .context("missing --owner (or `owner` in .readysteady.toml)")?;
    let repo = cli
        .repo
        .or_else(|| cfg.repo.clone())
        .context("missing --repo (or `repo` in .readysteady.toml)")?;
    // Reject an unusable tag before asking for credentials.
    release_name_for_tag(&cli.tag)?;

    tracing::info!("Checking for GitHub authentication token");
    let token = github::token(cfg.token_env())?;
    let client = Arc::new(GitHubReleases::new(token, cfg.api_url.as_deref())?);
    tracing::info!("GitHub authentication token detected");

    let params = WorkflowParameters {
        owner,
        repo,
        tag: cli.tag,
        force: cli.force,
        files: cli.files,
        strict_tag_check: cli.strict_tag_check || cfg.strict_tag_check,
    };
    tracing::debug!(
        "workflow: repo={}/{} tag={} force={} files={}",
        params.owner,
        params.repo,
        params.tag,
        params.force,
        params.files.len()
    );

    let release = perform_release_workflow(&client, &FsAssetSource, &params).await?;
    Ok(release)
}
