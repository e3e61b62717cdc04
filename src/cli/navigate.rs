//! Navigation commands: up, down, top, bottom, move

use crate::cli::context::CommandContext;
use crate::cli::print_branch_results;
use crate::cli::style::{Stylize, check};
use anstream::println;
use git_ryu::error::Result;
use git_ryu::navigate;
use git_ryu::repo::Vcs;
use std::path::Path;

/// Direction to move the checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// One branch up
    Up,
    /// One branch down
    Down,
    /// Up to a leaf
    Top,
    /// Down to the branch above the root
    Bottom,
}

/// Move the checkout through the stack
pub fn run_navigate(path: &Path, direction: Direction) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    let graph = ctx.graph()?;
    let prompter = ctx.prompter.as_ref();

    let target = match direction {
        Direction::Up => navigate::up(&ctx.repo, &graph, prompter)?,
        Direction::Down => navigate::down(&ctx.repo, &graph)?,
        Direction::Top => navigate::top(&ctx.repo, &graph, prompter)?,
        Direction::Bottom => navigate::bottom(&ctx.repo, &graph)?,
    };

    println!("{} Switched to {}", check(), target.accent());
    Ok(())
}

/// Move the current branch onto a new parent and restack it
pub fn run_move(path: &Path, new_parent: &str) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    let mut graph = ctx.graph()?;
    let branch = ctx.repo.current_branch()?.name;

    let report = navigate::move_branch(&ctx.repo, &mut graph, &branch, new_parent)?;
    ctx.save(&graph)?;

    println!(
        "{} Moved {} onto {}",
        check(),
        branch.accent(),
        new_parent.emphasis()
    );
    print_branch_results(&report.results, "Rebased");
    if !report.is_success() {
        println!(
            "{}",
            "Some branches could not be rebased; resolve them and run 'gryu restack'".warn()
        );
    }
    Ok(())
}
