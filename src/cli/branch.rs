//! Create and commit commands

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use git_ryu::error::{Error, Result};
use git_ryu::repo::Vcs;
use std::path::Path;

/// Create a branch on top of the current one and check it out
pub fn run_create(path: &Path, name: &str) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    let mut graph = ctx.graph()?;

    let current = graph.resolve_current(&ctx.repo.current_branch()?);
    if !current.tracked {
        return Err(Error::BranchNotFound(current.branch.name));
    }
    if graph.contains(name) {
        return Err(Error::DuplicateBranch(name.to_string()));
    }

    let parent = current.branch.name;
    let created = ctx.repo.new_branch(name, Some(&parent))?;
    graph.add_branch(name, &parent, &created.head_sha)?;
    ctx.save(&graph)?;

    println!(
        "{} Created {} on top of {}",
        check(),
        name.accent(),
        parent.emphasis()
    );
    Ok(())
}

/// Long options that supply a message or reuse an existing one
const MESSAGE_OPTIONS: &[&str] = &[
    "--message",
    "--file",
    "--no-edit",
    "--amend",
    "--reuse-message",
    "--reedit-message",
    "--fixup",
    "--squash",
];

/// Whether passthrough commit arguments already carry a message
fn has_message(args: &[String]) -> bool {
    args.iter().any(|arg| {
        MESSAGE_OPTIONS.iter().any(|option| arg.starts_with(option))
            || (arg.starts_with('-')
                && !arg.starts_with("--")
                && arg.contains(['m', 'F', 'C', 'c']))
    })
}

/// Commit on the current branch and refresh its cached head
pub fn run_commit(path: &Path, args: &[String]) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    let mut graph = ctx.graph()?;

    let mut args = args.to_vec();
    if !has_message(&args) {
        let message = ctx.prompter.input("Commit message", "")?;
        if message.trim().is_empty() {
            return Err(Error::Cancelled);
        }
        args.push("-m".to_string());
        args.push(message);
    }

    let output = ctx.repo.commit(&args)?.into_result("commit")?;
    println!("{}", output.output());

    let head = ctx.repo.current_branch()?;
    if graph.contains(&head.name) {
        graph.set_head(&head.name, &head.head_sha)?;
        ctx.save(&graph)?;

        let above = graph.descendants(&head.name)?.len();
        if above > 0 {
            println!(
                "{}",
                format!("{above} branch(es) above {}; run 'gryu restack' to update them", head.name)
                    .muted()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::has_message;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_message_flags_detected() {
        assert!(has_message(&args(&["-m", "msg"])));
        assert!(has_message(&args(&["-am", "msg"])));
        assert!(has_message(&args(&["--message=msg"])));
        assert!(has_message(&args(&["--amend"])));
        assert!(has_message(&args(&["-C", "HEAD"])));
        assert!(has_message(&args(&["--reuse-message=HEAD~1"])));
        assert!(has_message(&args(&["--fixup", "abc123"])));
        assert!(!has_message(&args(&["-a"])));
        assert!(!has_message(&args(&[])));
    }
}
