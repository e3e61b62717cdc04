//! Init command - set up gryu for a repository

use crate::cli::style::{Stylize, check, spinner_style};
use anstream::println;
use git_ryu::auth::{get_github_auth, test_github_auth};
use git_ryu::error::{Error, Result};
use git_ryu::graph::build_from_vcs;
use git_ryu::platform::parse_repo_info;
use git_ryu::prompt::{Prompter, default_prompter};
use git_ryu::repo::{GitRepo, Vcs, select_remote};
use git_ryu::tracking::{DEFAULT_TOKEN_ENV, StackState, load_state, save_state, state_path};
use git_ryu::types::{BranchScope, ReviewTool};
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

/// Answers supplied on the command line instead of prompts
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Root branch
    pub root: Option<String>,
    /// Remote name
    pub remote: Option<String>,
    /// Review tool
    pub review: Option<ReviewTool>,
    /// Skip confirmations
    pub yes: bool,
}

/// Run the init command
#[allow(clippy::future_not_send)]
pub async fn run_init(path: &Path, options: InitOptions) -> Result<()> {
    let repo = GitRepo::open(path)?;
    let state_file = state_path(&repo.root_dir()?)?;
    let prompter = default_prompter();

    if load_state(&state_file)?.is_some()
        && !options.yes
        && !prompter.confirm("gryu is already initialized here. Reinitialize?", false)?
    {
        println!("{}", "Aborted".muted());
        return Ok(());
    }

    let root = choose_root(&repo, prompter.as_ref(), options.root)?;
    let remotes = repo.remotes()?;
    let remote = if remotes.is_empty() && options.remote.is_none() {
        None
    } else {
        Some(select_remote(&remotes, options.remote.as_deref(), prompter.as_ref())?)
    };

    let tool = match (options.review, &remote) {
        (Some(tool), _) => tool,
        (None, None) => ReviewTool::None,
        (None, Some(_)) => {
            let names: Vec<String> = ReviewTool::ALL.iter().map(ToString::to_string).collect();
            let choice = prompter
                .select("Code review tool", &names)?
                .ok_or(Error::Cancelled)?;
            ReviewTool::ALL
                .get(choice)
                .copied()
                .ok_or(Error::Cancelled)?
        }
    };

    if tool == ReviewTool::GitHub {
        let remote = remote.as_deref().ok_or(Error::NoRemotes)?;
        verify_github(&repo.remote_url(remote)?).await?;
    }

    let graph = build_from_vcs(&repo, &root)?;
    let mut state = StackState::new(&root, remote.clone(), tool);
    state.record_graph(&graph);

    println!("{}", "Configuration:".emphasis());
    println!("  root branch  {}", root.accent());
    println!("  remote       {}", remote.as_deref().unwrap_or("(none)"));
    println!("  review tool  {tool}");
    println!("  branches     {}", graph.len());

    if !options.yes && !prompter.confirm("Save this configuration?", true)? {
        println!("{}", "Aborted".muted());
        return Ok(());
    }

    save_state(&state_file, &state)?;
    println!("{} Initialized gryu with root {}", check(), root.accent());
    Ok(())
}

/// Pick the root branch, preferring `main` and `master`
fn choose_root(repo: &GitRepo, prompter: &dyn Prompter, given: Option<String>) -> Result<String> {
    let mut branches: Vec<String> = repo
        .list_branches(BranchScope::Local)?
        .into_iter()
        .map(|b| b.name)
        .collect();

    if let Some(name) = given {
        return if branches.contains(&name) {
            Ok(name)
        } else {
            Err(Error::BranchNotFound(name))
        };
    }

    branches.sort_by_key(|name| match name.as_str() {
        "main" => 0,
        "master" => 1,
        _ => 2,
    });
    match branches.as_slice() {
        [] => Err(Error::Tracking(
            "no local branches yet; make a first commit before 'gryu init'".to_string(),
        )),
        [only] => Ok(only.clone()),
        _ => {
            let choice = prompter
                .select("Root branch", &branches)?
                .ok_or(Error::Cancelled)?;
            branches.get(choice).cloned().ok_or(Error::Cancelled)
        }
    }
}

async fn verify_github(remote_url: &str) -> Result<()> {
    let config = parse_repo_info(remote_url)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message("Checking GitHub credentials...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = async {
        let auth = get_github_auth(DEFAULT_TOKEN_ENV).await?;
        test_github_auth(&auth.token, config.host.as_deref()).await
    }
    .await;

    match result {
        Ok(login) => {
            spinner.finish_with_message(format!(
                "{} Authenticated as {} for {}/{}",
                check(),
                login.accent(),
                config.owner,
                config.repo
            ));
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e)
        }
    }
}
