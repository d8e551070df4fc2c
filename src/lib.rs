//! Drawn directory trees, parsed and materialized.
//!
//! Reads a tree diagram (box-drawing glyphs, indentation, optional icons and
//! `#` comments), reconstructs the hierarchy it describes, and creates it on
//! disk or persists it as a JSON snapshot.
//!
//! The public API is organised into layers:
//!
//! - **[`tree`]**: line classification, depth/parent resolution, the entry
//!   store, sanitizing, snapshots and rendering
//! - **[`resources`]**: idempotent `check + apply` filesystem primitives
//! - **[`compose`]**: the steps that turn a store into directories, files
//!   and symlinks
//! - **[`session`]**: one command run's configuration, logger and store
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod compose;
pub mod config;
pub mod error;
pub mod logging;
pub mod resources;
pub mod session;
pub mod tree;
