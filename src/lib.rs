//! reqlab - a local API workbench
//!
//! Stores requests, environments, and execution history as JSON files
//! under a per-user data directory, and runs requests through a pipeline
//! of variable substitution, sandboxed pre/post scripts, and HTTP
//! dispatch.

pub mod auth;
pub mod backup;
pub mod cli;
pub mod client;
pub mod errors;
pub mod exec;
pub mod models;
pub mod openapi;
pub mod scripting;
pub mod storage;
pub mod vars;
pub mod workspace;

pub use errors::{ReqlabError, Result};
