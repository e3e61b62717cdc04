//! Merge sequencer for stacked reviews
//!
//! Two halves:
//! 1. Plan - decide what would happen for each branch (pure, used for previews)
//! 2. Execute - walk the stack bottom-up, fetching each review just before
//!    deciding on it, and merge until done or gated

mod execute;
mod plan;

pub use execute::{HaltReason, MergeExecutionResult, MergeHalt, MergeOptions, execute_merge};
pub use plan::{
    MergeConfidence, MergePlan, MergeStep, StackEntry, create_merge_plan, decide_step, merge_stack,
};
