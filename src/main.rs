//! gryu - stacked branches for git

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use cli::config::ConfigAction;
use cli::init::InitOptions;
use cli::merge::MergeCommandOptions;
use cli::navigate::Direction;
use cli::style::Stylize;
use git_ryu::error::Result;
use git_ryu::types::{MergeMethod, ReviewTool};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "gryu", version, about = "Stacked branches for git with review-gated merges")]
struct Cli {
    /// Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Run as if started in this directory
    #[arg(long, global = true, default_value = ".")]
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up gryu for this repository
    Init {
        /// Root (trunk) branch
        #[arg(long)]
        root: Option<String>,
        /// Remote to sync and submit against
        #[arg(long)]
        remote: Option<String>,
        /// Code review tool (none, github)
        #[arg(long)]
        review: Option<ReviewTool>,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Create a branch on top of the current one
    #[command(alias = "bc")]
    Create {
        /// Name of the new branch
        name: String,
    },

    /// Commit on the current branch (arguments are passed to git commit)
    #[command(alias = "cc")]
    Commit {
        /// Arguments for git commit
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Check out the branch above the current one
    #[command(alias = "bu")]
    Up,

    /// Check out the parent of the current branch
    #[command(alias = "bd")]
    Down,

    /// Check out the top of the stack
    #[command(alias = "bt")]
    Top,

    /// Check out the branch directly above the root
    #[command(alias = "bb")]
    Bottom,

    /// Move the current branch onto a new parent
    #[command(alias = "mv")]
    Move {
        /// New parent branch
        parent: String,
    },

    /// Show every stack as a tree
    Log,

    /// Fetch, pull, prune merged branches and restack
    Sync,

    /// Rebase branches onto their parents
    Restack {
        /// Start from this branch instead of the root
        #[arg(long)]
        branch: Option<String>,
    },

    /// Fold the current branch into its parent
    #[command(alias = "sq")]
    Squish {
        /// Keep folding down to the branch above the root
        #[arg(long)]
        all: bool,
    },

    /// Push the current stack and open or update reviews
    Submit,

    /// List open reviews
    #[command(alias = "rv")]
    Review {
        /// Only reviews for this head branch
        branch: Option<String>,
        /// Only reviews into this base branch
        base: Option<String>,
    },

    /// Merge approved reviews from the bottom of the stack up
    #[command(alias = "m")]
    Merge {
        /// Show what would be merged without merging
        #[arg(long)]
        dry_run: bool,
        /// Sync with the remote first
        #[arg(long)]
        sync: bool,
        /// Merge method (merge, squash, rebase); defaults to the configured one
        #[arg(long)]
        method: Option<MergeMethod>,
    },

    /// Show or change the stored configuration
    #[command(alias = "cfg")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommand>,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum ConfigCommand {
    /// Print the configuration (default)
    Show,
    /// Delete the stored state for this repository
    Delete,
    /// Rebuild tracked branches from git upstreams
    Reset,
}

impl From<ConfigCommand> for ConfigAction {
    fn from(command: ConfigCommand) -> Self {
        match command {
            ConfigCommand::Show => Self::Show,
            ConfigCommand::Delete => Self::Delete,
            ConfigCommand::Reset => Self::Reset,
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        anstream::eprintln!("failed to install logger: {e}");
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> Result<()> {
    let path = cli.path.as_path();
    match cli.command {
        Commands::Init {
            root,
            remote,
            review,
            yes,
        } => {
            cli::init::run_init(
                path,
                InitOptions {
                    root,
                    remote,
                    review,
                    yes,
                },
            )
            .await
        }
        Commands::Create { name } => cli::branch::run_create(path, &name),
        Commands::Commit { args } => cli::branch::run_commit(path, &args),
        Commands::Up => cli::navigate::run_navigate(path, Direction::Up),
        Commands::Down => cli::navigate::run_navigate(path, Direction::Down),
        Commands::Top => cli::navigate::run_navigate(path, Direction::Top),
        Commands::Bottom => cli::navigate::run_navigate(path, Direction::Bottom),
        Commands::Move { parent } => cli::navigate::run_move(path, &parent),
        Commands::Log => cli::log::run_log(path),
        Commands::Sync => cli::sync::run_sync(path),
        Commands::Restack { branch } => cli::restack::run_restack(path, branch.as_deref()),
        Commands::Squish { all } => cli::squish::run_squish(path, all),
        Commands::Submit => cli::submit::run_submit(path).await,
        Commands::Review { branch, base } => {
            cli::review::run_review(path, branch.as_deref(), base.as_deref()).await
        }
        Commands::Merge {
            dry_run,
            sync,
            method,
        } => {
            cli::merge::run_merge(
                path,
                MergeCommandOptions {
                    dry_run,
                    sync,
                    method,
                },
            )
            .await
        }
        Commands::Config { action } => {
            cli::config::run_config(path, action.map(Into::into).unwrap_or_default())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            anstream::eprintln!("{} {e}", "error:".error());
            ExitCode::FAILURE
        }
    }
}
