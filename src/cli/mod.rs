//! Command handlers for the `gryu` binary

pub mod branch;
pub mod config;
pub mod context;
pub mod init;
pub mod log;
pub mod merge;
pub mod navigate;
pub mod restack;
pub mod review;
pub mod squish;
pub mod style;
pub mod submit;
pub mod sync;

use crate::cli::style::{Stylize, arrow, check, link};
use anstream::println;
use async_trait::async_trait;
use git_ryu::submit::ProgressCallback;
use git_ryu::types::{BranchOutcome, BranchResult, Review};

/// Prints progress lines as review operations happen
pub struct CliProgress {
    show_messages: bool,
}

impl CliProgress {
    /// Only pushes and review changes
    pub const fn compact() -> Self {
        Self {
            show_messages: false,
        }
    }

    /// Every status message as well
    pub const fn verbose() -> Self {
        Self {
            show_messages: true,
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        if self.show_messages {
            println!("  {} {message}", arrow());
        }
    }

    async fn on_pushed(&self, branch: &str, remote: &str) {
        println!("{} Pushed {} to {}", check(), branch.accent(), remote.muted());
    }

    async fn on_review(&self, review: &Review, created: bool) {
        let verb = if created { "Opened" } else { "Updated" };
        let label = format!("#{}", review.id);
        println!(
            "{} {verb} {} {} {}",
            check(),
            link(&label, &review.url).accent(),
            review.title,
            format!("({} {} {})", review.branch, arrow(), review.base).muted()
        );
    }
}

/// Print one line per cascade result
pub fn print_branch_results(results: &[BranchResult], verb: &str) {
    for result in results {
        match &result.outcome {
            BranchOutcome::Succeeded => {
                println!("  {} {verb} {}", check(), result.branch.accent());
            }
            BranchOutcome::Failed(output) => {
                println!("  {} {}", style::cross(), result.branch.warn());
                for line in output.lines() {
                    println!("      {}", line.muted());
                }
            }
            BranchOutcome::Skipped(reason) => {
                println!(
                    "  {} {} {}",
                    "-".muted(),
                    result.branch.muted(),
                    format!("({reason})").muted()
                );
            }
        }
    }
}
