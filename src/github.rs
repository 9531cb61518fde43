use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http;
use crate::issue::{IssueRecord, IssueRef};
use crate::reconcile::GitTracker;

const SERVICE: &str = "GitHub";

const MEDIA_TYPE: &str = "application/vnd.github+json";

const PER_PAGE: usize = 100;

// Response types for the REST API

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub login: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
}

/// Represents a GitHub issue as returned by the issues endpoints
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Issue {
    /// The issue number within its repository
    pub number: u64,
    pub title: String,
    /// Either "open" or "closed"
    pub state: String,
    pub html_url: String,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub assignees: Vec<User>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    /// Present when the "issue" is actually a pull request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Login of the primary assignee, empty when unassigned
    pub fn assignee_login(&self) -> &str {
        self.assignee
            .as_ref()
            .or_else(|| self.assignees.first())
            .map(|user| user.login.as_str())
            .unwrap_or("")
    }

    pub fn to_record(&self, reference: &IssueRef) -> IssueRecord {
        IssueRecord::new(reference.to_string())
            .with_status(&self.state)
            .with_assignee(self.assignee_login())
            .with_url(&self.html_url)
    }
}

/// A repository given as `ORG/REPO`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl FromStr for RepoSlug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split('/').collect::<Vec<_>>().as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(Error::InvalidInput(format!(
                "invalid project {:?} (expected ORG/REPO)",
                s
            ))),
        }
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Filters for listing open issues of a repository
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub project: RepoSlug,
    /// Milestone number from the URL, not the display name
    pub milestone: Option<String>,
    pub assignee: Option<String>,
    pub labels: Vec<String>,
}

impl ListOptions {
    pub fn new(project: RepoSlug) -> Self {
        Self {
            project,
            milestone: None,
            assignee: None,
            labels: Vec::new(),
        }
    }

    /// Query parameters for one page of the issues endpoint
    fn query(&self, page: usize) -> Vec<(&'static str, String)> {
        let mut query = vec![("state", "open".to_string())];
        if let Some(milestone) = self.milestone.as_deref().filter(|m| !m.is_empty()) {
            query.push(("milestone", milestone.to_string()));
        }
        if let Some(assignee) = self.assignee.as_deref().filter(|a| !a.is_empty()) {
            query.push(("assignee", assignee.to_string()));
        }
        let labels: Vec<&str> = self
            .labels
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        if !labels.is_empty() {
            query.push(("labels", labels.join(",")));
        }
        query.push(("per_page", PER_PAGE.to_string()));
        query.push(("page", page.to_string()));
        query
    }
}

/// Read-only client for the GitHub REST API
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http::client(timeout)?,
            api_url: api_url.into(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.github.api_url.clone(),
            config.github_token().map(str::to_string),
            config.timeout(),
        )
    }

    /// Check that the API is reachable and the token, if any, is accepted
    pub fn connect(&self) -> Result<()> {
        let response = self.request("rate_limit").send()?;
        http::check(SERVICE, response)?;
        tracing::debug!(api = %self.api_url, authenticated = self.token.is_some(), "connected to GitHub");
        Ok(())
    }

    /// Fetch a single issue
    pub fn issue(&self, reference: &IssueRef) -> Result<Issue> {
        let path = format!(
            "repos/{}/{}/issues/{}",
            reference.owner, reference.repo, reference.number
        );
        self.get_json(self.request(&path))
    }

    /// List open issues matching the filters, excluding pull requests
    pub fn list_issues(&self, options: &ListOptions) -> Result<Vec<Issue>> {
        let path = format!(
            "repos/{}/{}/issues",
            options.project.owner, options.project.repo
        );
        let mut issues = Vec::new();

        for page in 1.. {
            let batch: Vec<Issue> = self.get_json(self.request(&path).query(&options.query(page)))?;
            tracing::debug!(project = %options.project, page, len = batch.len(), "fetched issue page");

            if collect_page(batch, &mut issues) {
                break;
            }
        }

        Ok(issues)
    }

    fn request(&self, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .get(http::join(&self.api_url, path))
            .header(ACCEPT, MEDIA_TYPE);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = http::check(SERVICE, builder.send()?)?;
        Ok(response.json()?)
    }
}

/// Keep the real issues of a page; true when it was the last page
///
/// Pull requests count toward the page size before they are dropped.
fn collect_page(batch: Vec<Issue>, issues: &mut Vec<Issue>) -> bool {
    let last = batch.len() < PER_PAGE;
    issues.extend(batch.into_iter().filter(|issue| !issue.is_pull_request()));
    last
}

impl GitTracker for GitHubClient {
    fn fetch_issue(&self, reference: &IssueRef) -> Result<IssueRecord> {
        let issue = self.issue(reference)?;
        Ok(issue.to_record(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUE_JSON: &str = r#"{
        "number": 6001,
        "title": "Bump dependencies",
        "state": "open",
        "html_url": "https://github.com/operator-framework/operator-sdk/issues/6001",
        "assignee": null,
        "assignees": [{"login": "jmrodri"}],
        "labels": [{"name": "kind/bug"}, {"name": "triage/needs-information"}],
        "milestone": {"number": 12, "title": "v1.30.0"},
        "comments": 3
    }"#;

    #[test]
    fn test_issue_deserialize() {
        let issue: Issue = serde_json::from_str(ISSUE_JSON).unwrap();

        assert_eq!(issue.number, 6001);
        assert!(!issue.is_pull_request());
        assert_eq!(issue.assignee_login(), "jmrodri");
        assert_eq!(issue.labels.len(), 2);
        assert_eq!(issue.milestone.as_ref().unwrap().number, 12);
    }

    #[test]
    fn test_issue_to_record() {
        let issue: Issue = serde_json::from_str(ISSUE_JSON).unwrap();
        let reference = IssueRef::new("operator-framework", "operator-sdk", 6001);

        let record = issue.to_record(&reference);

        assert_eq!(record.name, "operator-framework/operator-sdk#6001");
        assert_eq!(record.status, "open");
        assert_eq!(record.assignee, "jmrodri");
        assert_eq!(record.url, issue.html_url);
    }

    #[test]
    fn test_pull_request_detected() {
        let json = r#"{
            "number": 1, "title": "PR", "state": "open",
            "html_url": "https://github.com/o/r/pull/1",
            "pull_request": {"url": "https://api.github.com/repos/o/r/pulls/1"}
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();

        assert!(issue.is_pull_request());
        assert_eq!(issue.assignee_login(), "");
    }

    #[test]
    fn test_repo_slug_parse() {
        let slug: RepoSlug = "operator-framework/operator-sdk".parse().unwrap();
        assert_eq!(slug.owner, "operator-framework");
        assert_eq!(slug.repo, "operator-sdk");
        assert_eq!(slug.to_string(), "operator-framework/operator-sdk");

        assert!("operator-sdk".parse::<RepoSlug>().is_err());
        assert!("a/b/c".parse::<RepoSlug>().is_err());
        assert!("/repo".parse::<RepoSlug>().is_err());
    }

    #[test]
    fn test_list_query() {
        let mut options = ListOptions::new("o/r".parse().unwrap());
        options.milestone = Some("12".into());
        options.labels = vec!["documentation".into(), " bug ".into(), "".into()];

        let query = options.query(2);

        assert!(query.contains(&("state", "open".to_string())));
        assert!(query.contains(&("milestone", "12".to_string())));
        assert!(query.contains(&("labels", "documentation,bug".to_string())));
        assert!(query.contains(&("page", "2".to_string())));
        assert!(!query.iter().any(|(key, _)| *key == "assignee"));
    }

    fn page(len: usize, pull_requests: usize) -> Vec<Issue> {
        (0..len as u64)
            .map(|number| {
                let mut issue: Issue = serde_json::from_str(ISSUE_JSON).unwrap();
                issue.number = number;
                if (number as usize) < pull_requests {
                    issue.pull_request = Some(serde_json::json!({}));
                }
                issue
            })
            .collect()
    }

    #[test]
    fn test_collect_full_page_with_pull_requests() {
        let mut issues = Vec::new();

        let last = collect_page(page(PER_PAGE, 30), &mut issues);

        assert!(!last);
        assert_eq!(issues.len(), PER_PAGE - 30);
        assert!(issues.iter().all(|issue| !issue.is_pull_request()));
    }

    #[test]
    fn test_collect_short_page_is_last() {
        let mut issues = Vec::new();

        assert!(collect_page(page(7, 0), &mut issues));
        assert_eq!(issues.len(), 7);
    }

    #[test]
    fn test_collect_empty_page_is_last() {
        let mut issues = Vec::new();

        // a repository with exactly PER_PAGE issues ends on an empty page
        assert!(!collect_page(page(PER_PAGE, 0), &mut issues));
        assert!(collect_page(page(0, 0), &mut issues));
        assert_eq!(issues.len(), PER_PAGE);
    }
}
