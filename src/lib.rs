//! git-ryu: stacked branches for git with review-gated merges
//!
//! Branches form a tree rooted at a trunk branch. The library keeps that
//! tree in sync with git, cascades rebases through it, and drives reviews
//! for each branch against its parent.

pub mod auth;
pub mod error;
pub mod graph;
pub mod merge;
pub mod navigate;
pub mod platform;
pub mod prompt;
pub mod repo;
pub mod restack;
pub mod squash;
pub mod submit;
pub mod sync;
pub mod tracking;
pub mod types;
