//! # tagsync
//!
//! **tagsync** keeps local clones of git repositories pinned to tags.
//!
//! Features:
//! - `tagsync sync` brings every target in `$(tagsync home)/config.toml` to its tag
//! - `tagsync init <remote> <tag>` synchronizes a single pair
//! - `tagsync list` shows configured targets and the state of their clones
//! - `tagsync edit` opens the config in `$EDITOR`
//! - `tagsync home` prints the tagsync home directory
//!
//! Log verbosity comes from `-v` or the `TAGSYNC_LOG` environment variable.

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tagsync::{InitArgs, cmd_edit, cmd_init, cmd_list, cmd_sync, tagsync_home};
use tracing_subscriber::EnvFilter;

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "tagsync",
    version,
    about = "tagsync - keep local git clones pinned to tags",
    arg_required_else_help = true
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Synchronize every target in config.toml
    Sync,
    /// Synchronize one remote at one tag
    Init(InitCmd),
    /// List configured targets and their local clones
    List,
    /// Open config.toml in $EDITOR
    Edit,
    /// Print the tagsync home directory
    Home,
}

#[derive(Args, Debug)]
struct InitCmd {
    /// Remote URL
    remote: String,
    /// Tag to check out
    tag: String,
    /// Username for key authentication
    #[arg(long)]
    user: Option<String>,
    /// Password or key passphrase
    #[arg(long, conflicts_with = "password_env")]
    password: Option<String>,
    /// Read the password or key passphrase from this environment variable
    #[arg(long)]
    password_env: Option<String>,
    /// Private key file
    #[arg(long)]
    key: Option<PathBuf>,
    /// Directory to place the `<remote>-<tag>` clone under
    #[arg(long)]
    root: Option<PathBuf>,
}

impl From<InitCmd> for InitArgs {
    fn from(c: InitCmd) -> Self {
        InitArgs {
            remote: c.remote,
            tag: c.tag,
            user: c.user,
            password: c.password,
            password_env: c.password_env,
            key: c.key,
            root: c.root,
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("TAGSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// CLI entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Cmd::Sync => cmd_sync(),
        Cmd::Init(c) => cmd_init(&c.into()),
        Cmd::List => cmd_list(),
        Cmd::Edit => cmd_edit(),
        Cmd::Home => {
            println!("{}", tagsync_home()?.display());
            Ok(())
        }
    }
}
