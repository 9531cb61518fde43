//! # gh2jira
//!
//! Compares Jira tickets with the GitHub issues they track and reports
//! which pairs disagree under a configurable status workflow.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
mod http;
pub mod issue;
pub mod jira;
pub mod list;
pub mod output;
pub mod reconcile;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use issue::{IssueRecord, IssueRef, Pair, TypeResults};
pub use workflow::Workflow;
