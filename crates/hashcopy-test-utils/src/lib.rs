//! Shared test fixtures for the hashcopy workspace.
//!
//! Dev-dependency only. Never published.
//!
//! # Modules
//!
//! - [`tree`]: [`AssetTree`], a temporary project with sources, pinned
//!   timestamps and manifest helpers

pub mod tree;

pub use tree::{AssetTree, PINNED_MTIME};
