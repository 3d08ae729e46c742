// Entrypoint for the CLI. Keeps `main` small: parse flags, set up logging,
// assemble the immutable Config and hand off to the run loop. This is the
// only place an error becomes an exit code.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use casup::config::Config;
use casup::keys;
use casup::run::run;

#[derive(Parser)]
#[command(name = "casup", version)]
#[command(about = "Upload files to a content-addressed storage service")]
struct Cli {
    /// Files to upload; read from stdin (one path per line) when omitted.
    files: Vec<PathBuf>,

    /// Base URL of the storage service (default: $CASUP_URL).
    #[arg(short, long)]
    url: Option<String>,

    /// File holding the base58 publishing key (default: $CASUP_KEY).
    #[arg(short = 'k', long, value_name = "FILE")]
    key_file: Option<PathBuf>,

    /// Skip magic-byte content sniffing; use file extensions only.
    #[arg(long)]
    no_sniff: bool,

    /// Generate a fresh publishing key for every file.
    #[arg(long)]
    unique: bool,

    /// Resolve and print MIME types without uploading anything.
    #[arg(short = 'n', long)]
    dry_run: bool,

    #[arg(short, long)]
    verbose: bool,

    /// Upload FILE to the key's root path as the index document.
    #[arg(long, value_name = "FILE")]
    index: Option<PathBuf>,

    /// Upload duplicate paths instead of skipping repeats.
    #[arg(long)]
    no_dedup: bool,

    /// Post to a neutral echo endpoint instead of the service.
    #[arg(long, hide = true)]
    debug_post: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = try_main(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let base_url = Config::base_url_from(cli.url).context("invalid base URL")?;
    let key = match &cli.key_file {
        Some(path) => keys::read_key_file(path)?,
        None => keys::key_from_env()?,
    };
    let config = Config {
        base_url,
        sniff_mime: !cli.no_sniff,
        verbose: cli.verbose,
        dry_run: cli.dry_run,
        dedup: !cli.no_dedup,
        unique_key: cli.unique,
        key,
        index: cli.index,
        debug_post: cli.debug_post,
    };
    run(&config, cli.files)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
