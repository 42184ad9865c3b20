//! # x07reg
//!
//! Command-line client for x07 package registries.
//!
//! This is the entry point: it parses arguments, sets up logging and the
//! panic hook, and dispatches to the command handlers. Failures are printed
//! through the error formatter and exit with status 1.

use std::collections::HashMap;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Query and manage packages on an x07 registry
#[derive(Parser)]
#[command(name = "x07reg", version, about = "Query and manage packages on an x07 registry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags accepted by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Registry web origin serving the bootstrap document
    #[arg(long, global = true, value_name = "URL")]
    pub origin: Option<String>,

    /// Sparse index root, used when no origin is set
    #[arg(long, global = true, value_name = "URL")]
    pub index_base: Option<String>,

    /// API token for this invocation only
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Print canonical JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    /// Command-line layer of the settings merge
    pub fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(origin) = &self.origin {
            overrides.insert("origin".to_string(), origin.clone());
        }
        if let Some(index_base) = &self.index_base {
            overrides.insert("index_base".to_string(), index_base.clone());
        }
        if let Some(token) = &self.token {
            overrides.insert("token".to_string(), token.clone());
        }
        overrides
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the sparse-index path of a package
    Path { name: String },
    /// List every index entry of a package
    Entries { name: String },
    /// Show the latest usable version of a package
    Latest {
        name: String,
        /// Only consider versions matching this requirement
        #[arg(long, value_name = "REQ")]
        req: Option<String>,
    },
    /// Show package metadata (defaults to the latest usable version)
    Info {
        name: String,
        version: Option<String>,
    },
    /// List the package catalog
    Catalog,
    /// Search packages
    Search {
        query: Option<String>,
        #[arg(long, default_value_t = x07_registry::DEFAULT_SEARCH_LIMIT)]
        limit: u64,
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// List the owners of a package
    Owners { name: String },
    /// Print the archive URL of a version
    DownloadUrl { name: String, version: String },
    /// Manage API tokens
    Tokens {
        #[command(subcommand)]
        action: TokenCommands,
    },
    /// Yank a version, or un-yank it with --undo
    Yank {
        name: String,
        version: String,
        #[arg(long)]
        undo: bool,
    },
    /// Show the current account or session
    Whoami,
    /// Save an API token for later invocations
    Login { token: String },
    /// Forget the saved token and end the session
    Logout,
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// List tokens of the current account
    List,
    /// Create a token
    Create {
        label: String,
        #[arg(long = "scope", value_name = "SCOPE")]
        scopes: Vec<String>,
    },
    /// Revoke a token
    Revoke { id: String },
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.global.verbose);
    setup_panic_handler();

    debug!("starting x07reg v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run_cli(cli) {
        eprint!("{}", ErrorFormatter::new().format_report(&err));
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;

    rt.block_on(async {
        let Cli { command, global } = cli;
        let ctx = CommandContext::from_args(&global).await?;
        commands::dispatch_command(command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "x07reg={level},x07_registry={level},x07_config={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("x07reg encountered an unexpected error: {}", panic_info);
        eprintln!("x07reg crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}
