use std::path::PathBuf;

use crate::cli::{Args, Command, ListArgs, ReconcileArgs};
use crate::config::{self, Config};
use crate::error::Result;
use crate::github::{GitHubClient, ListOptions, RepoSlug};
use crate::jira::JiraClient;
use crate::list;
use crate::output::{self, Palette};
use crate::reconcile;
use crate::workflow::{Workflow, DEFAULT_WORKFLOW_FILE};

/// Main application entry point
pub fn run(args: Args) -> Result<()> {
    let palette = Palette::detect(args.no_color);

    match &args.command {
        Command::List(list_args) => run_list(&args, list_args, palette),
        Command::Reconcile(reconcile_args) => run_reconcile(&args, reconcile_args, palette),
    }
}

/// Load the config file and layer flags and environment on top
fn load_config(args: &Args) -> Result<Config> {
    let config = match args.config.clone().or_else(config::default_config_path) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    Ok(config.with_overrides(args.overrides()))
}

fn run_list(args: &Args, list_args: &ListArgs, palette: Palette) -> Result<()> {
    let project: RepoSlug = list_args.project.parse()?;
    let config = load_config(args)?;

    let mut options = ListOptions::new(project);
    options.milestone = list_args.milestone.clone();
    options.assignee = list_args.assignee.clone();
    options.labels = list_args.label.clone();

    let github = GitHubClient::from_config(&config)?;
    let issues = github.list_issues(&options)?;
    tracing::info!(project = %options.project, count = issues.len(), "listed issues");

    print!("{}", list::render(&issues, palette));
    Ok(())
}

fn run_reconcile(args: &Args, reconcile_args: &ReconcileArgs, palette: Palette) -> Result<()> {
    let workflow_file = reconcile_args
        .workflow_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKFLOW_FILE));
    let workflow = Workflow::from_file(&workflow_file)?;
    tracing::info!(workflow = workflow.name(), rules = workflow.len(), "loaded workflow");
    if workflow.is_empty() {
        tracing::warn!(file = %workflow_file.display(), "workflow has no rules, every pair will mismatch");
    }

    let config = load_config(args)?;
    let jql = reconcile::jql_for_project(config.jira_project()?);

    let github = GitHubClient::from_config(&config)?;
    github.connect()?;

    let jira = JiraClient::from_config(&config)?;
    jira.connect()?;

    let results = reconcile::reconcile(&jql, &jira, &github, &workflow)?;

    print!("{}", output::render(&results, reconcile_args.output, palette)?);
    Ok(())
}
