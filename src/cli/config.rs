//! Config command - show, delete or reset persisted state

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, arrow, check};
use anstream::println;
use git_ryu::error::Result;
use git_ryu::graph::build_from_vcs;
use git_ryu::tracking::{delete_state, save_state};
use std::path::Path;

/// Config subcommands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the configuration
    #[default]
    Show,
    /// Remove the state file
    Delete,
    /// Rebuild tracked branches from git
    Reset,
}

/// Run the config command
pub fn run_config(path: &Path, action: ConfigAction) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    match action {
        ConfigAction::Show => {
            show(&ctx);
            Ok(())
        }
        ConfigAction::Delete => {
            if !ctx
                .prompter
                .confirm("Delete gryu state for this repository?", false)?
            {
                println!("{}", "Aborted".muted());
                return Ok(());
            }
            if delete_state(&ctx.state_path)? {
                println!("{} Deleted {}", check(), ctx.state_path.display());
            }
            Ok(())
        }
        ConfigAction::Reset => {
            if !ctx.prompter.confirm(
                "Rebuild tracked branches from git upstreams? Parents set with gryu are replaced",
                false,
            )? {
                println!("{}", "Aborted".muted());
                return Ok(());
            }
            let graph = build_from_vcs(&ctx.repo, &ctx.state.root_branch)?;
            ctx.state.record_graph(&graph);
            save_state(&ctx.state_path, &ctx.state)?;
            println!(
                "{} Tracking {} branch(es) from {}",
                check(),
                graph.len().accent(),
                ctx.state.root_branch.emphasis()
            );
            Ok(())
        }
    }
}

fn show(ctx: &CommandContext) {
    let state = &ctx.state;
    println!("{} {}", "State file:".emphasis(), ctx.state_path.display());
    println!("  root_branch      {}", state.root_branch.accent());
    println!(
        "  remote           {}",
        state.remote.as_deref().unwrap_or("(ask)")
    );
    println!("  code_review_tool {}", state.code_review_tool);
    println!("  credentials      {}", state.token_env());
    println!("  merge_method     {}", state.merge_method);
    println!("{} {}", "Branches:".emphasis(), state.branches.len());
    for (name, record) in &state.branches {
        if record.parent.is_empty() {
            println!("  {} {}", name.accent(), "(root)".muted());
        } else {
            println!("  {} {} {}", name.accent(), arrow(), record.parent);
        }
    }
}
