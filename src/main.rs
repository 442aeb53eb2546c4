//! Commandline entrypoint.
//!
//! Fetches the JSON for one or more tweets by ID, writing one raw
//! document per line to stdout (logs go to stderr). With `--project`,
//! each raw document is followed by a projected copy keeping only a
//! whitelist of fields.

#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use fetch_tweets::{
    parse_ids, parse_path_spec, project_str, FetchConfig, PathTree, TweetFetcher,
    TwitterLookupClient, DEFAULT_FIELDS,
};

/// Fetch tweet JSON by ID, in rate-limit-aware batches.
#[derive(Parser)]
#[command(name = "fetch-tweets", version, about)]
struct Cli {
    /// ID of tweet(s) to fetch
    #[arg(short, long = "ids", value_name = "ID", num_args = 1.., value_delimiter = ',')]
    ids: Vec<String>,

    /// File of tweet IDs to fetch (one per line)
    #[arg(short = 'f', long = "ids-file", value_name = "FILE")]
    ids_file: Option<PathBuf>,

    /// TOML file with Twitter OAuth credentials
    #[arg(short, long, value_name = "FILE", default_value = "./twitter.toml")]
    credentials: PathBuf,

    /// Also emit a projected copy of each tweet, keeping only these dotted
    /// field paths (comma separated); pass the flag with no value for the
    /// built-in safe list
    #[arg(short, long, value_name = "PATHS", num_args = 0..=1, default_missing_value = "")]
    project: Option<String>,

    /// Debug mode
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs to stderr so stdout stays clean NDJSON.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    // Collect ids from the commandline and/or a nearby file, and reject
    // bad input before spending any API quota.
    let mut tokens = cli.ids.clone();
    if let Some(path) = &cli.ids_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        tokens.extend(text.lines().map(str::to_string));
    }
    let ids = parse_ids(&tokens)?;
    anyhow::ensure!(!ids.is_empty(), "no tweet ids given (use --ids or --ids-file)");

    let tree = cli.project.as_deref().map(|spec| {
        if spec.trim().is_empty() {
            PathTree::build(DEFAULT_FIELDS.iter().copied())
        } else {
            PathTree::build(parse_path_spec(spec))
        }
    });

    let config = FetchConfig::load(&cli.credentials)?;
    let client = TwitterLookupClient::new(&config)?;

    info!(ids = ids.len(), "Fetching tweets");

    let mut rx = TweetFetcher::new(client).fetch(ids);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    while let Some(raw) = rx.recv().await {
        writeln!(out, "{raw}")?;
        if let Some(tree) = &tree {
            writeln!(out, "{}", project_str(tree, &raw))?;
        }
    }

    Ok(())
}
