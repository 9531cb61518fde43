//! Pairing Jira tickets with their GitHub issues and classifying each pair

use std::collections::HashMap;

use crate::error::Result;
use crate::issue::{IssueRecord, IssueRef, Pair, TypeResults};
use crate::workflow::Workflow;

/// A Jira ticket together with the GitHub issue it tracks, if any
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedIssue {
    pub issue: IssueRecord,
    pub link: Option<IssueRef>,
}

/// Source of Jira tickets
pub trait JiraTracker {
    /// Tickets matching `jql`, in search order, each with its cross-reference
    fn linked_issues(&self, jql: &str) -> Result<Vec<LinkedIssue>>;
}

/// Source of GitHub issues
pub trait GitTracker {
    fn fetch_issue(&self, reference: &IssueRef) -> Result<IssueRecord>;
}

/// Default query: every ticket of the project that isn't closed
pub fn jql_for_project(project: &str) -> String {
    format!("project={} and status != Closed", project)
}

/// Compare every ticket matched by `jql` with its GitHub counterpart
///
/// Tickets without a cross-reference are skipped. The first tracker error
/// aborts the run.
pub fn reconcile<J, G>(jql: &str, jira: &J, git: &G, workflow: &Workflow) -> Result<TypeResults>
where
    J: JiraTracker + ?Sized,
    G: GitTracker + ?Sized,
{
    let linked = jira.linked_issues(jql)?;
    tracing::info!(count = linked.len(), jql, "fetched Jira issues");

    let mut fetched: HashMap<IssueRef, IssueRecord> = HashMap::new();
    let mut results = TypeResults::default();
    let mut skipped = 0usize;

    for LinkedIssue { issue, link } in linked {
        let Some(reference) = link else {
            tracing::warn!(issue = %issue.name, "no linked GitHub issue, skipping");
            skipped += 1;
            continue;
        };

        let git_issue = match fetched.get(&reference) {
            Some(record) => record.clone(),
            None => {
                let record = git.fetch_issue(&reference)?;
                fetched.insert(reference, record.clone());
                record
            }
        };

        let pair = Pair::new(issue, git_issue);
        let verdict = workflow.classify(&pair);
        tracing::debug!(
            jira = %pair.jira.name,
            git = %pair.git.name,
            jira_status = %pair.jira.status,
            git_status = %pair.git.status,
            verdict = verdict.label(),
            "classified pair"
        );
        results.push(verdict, pair);
    }

    tracing::info!(
        matches = results.matches.len(),
        mismatches = results.mismatches.len(),
        skipped,
        "reconciliation finished"
    );

    Ok(results)
}
