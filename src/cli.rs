use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Overrides;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to ~/.config/gh2jira/config.yaml)
    #[clap(long, global = true, value_parser)]
    pub config: Option<PathBuf>,

    /// GitHub API token
    #[clap(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Jira API token
    #[clap(long, global = true, env = "JIRA_TOKEN", hide_env_values = true)]
    pub jira_token: Option<String>,

    /// Jira user; when set the token is sent with basic auth
    #[clap(long, global = true, env = "JIRA_USER")]
    pub jira_user: Option<String>,

    /// Jira server, e.g. https://issues.example.com
    #[clap(long, global = true, env = "JIRA_BASE_URL")]
    pub jira_base_url: Option<String>,

    /// Jira project key to reconcile
    #[clap(long, global = true, env = "JIRA_PROJECT")]
    pub jira_project: Option<String>,

    /// Disable colored output
    #[clap(long, global = true, default_value_t = false)]
    pub no_color: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List Github issues filtered by milestone, assignee, or label
    List(ListArgs),
    /// Reconcile github and jira issues
    Reconcile(ReconcileArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// The milestone ID from the url, not the display name
    #[clap(long)]
    pub milestone: Option<String>,

    /// Username the issue is assigned to
    #[clap(long)]
    pub assignee: Option<String>,

    /// Github project to list e.g. ORG/REPO
    #[clap(long, default_value = "operator-framework/operator-sdk")]
    pub project: String,

    /// Label i.e. --label "documentation,bug" or --label doc --label bug
    #[clap(long, value_delimiter = ',')]
    pub label: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ReconcileArgs {
    /// Output format
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// File containing the workflow definitions (defaults to workflows.yaml)
    #[clap(long)]
    pub workflow_file: Option<PathBuf>,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            github_token: self.github_token.clone(),
            jira_token: self.jira_token.clone(),
            jira_user: self.jira_user.clone(),
            jira_base_url: self.jira_base_url.clone(),
            jira_project: self.jira_project.clone(),
        }
    }
}
