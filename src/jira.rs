//! Jira integration for gh2jira
//!
//! Read-only access to the Jira REST API (v2):
//! - searching issues with JQL
//! - reading remote links to find the GitHub issue each ticket tracks
//!
//! Authentication is a bearer personal access token, or HTTP basic auth
//! when a Jira user is configured.

use std::time::Duration;

use base64::Engine;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::http;
use crate::issue::{IssueRecord, IssueRef};
use crate::reconcile::{JiraTracker, LinkedIssue};

const SERVICE: &str = "Jira";

const PAGE_SIZE: u64 = 50;

const SEARCH_FIELDS: &str = "status,assignee,description";

/// Credentials sent with every request
#[derive(Debug, Clone)]
pub enum JiraAuth {
    Bearer(String),
    Basic { username: String, api_token: String },
}

impl JiraAuth {
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config.jira_token()?.to_string();
        Ok(match config.jira_user() {
            Some(user) => JiraAuth::Basic {
                username: user.to_string(),
                api_token: token,
            },
            None => JiraAuth::Bearer(token),
        })
    }

    pub fn header_value(&self) -> String {
        match self {
            JiraAuth::Bearer(token) => format!("Bearer {}", token),
            JiraAuth::Basic {
                username,
                api_token,
            } => {
                let credentials = format!("{}:{}", username, api_token);
                format!(
                    "Basic {}",
                    base64::engine::general_purpose::STANDARD.encode(credentials)
                )
            }
        }
    }
}

// API types

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: Fields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fields {
    #[serde(default)]
    pub description: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub assignee: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLink {
    pub object: RemoteObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteObject {
    pub url: String,
}

impl Issue {
    pub fn to_record(&self, base_url: &str) -> IssueRecord {
        IssueRecord::new(&self.key)
            .with_status(&self.fields.status.name)
            .with_assignee(
                self.fields
                    .assignee
                    .as_ref()
                    .map(User::label)
                    .unwrap_or(""),
            )
            .with_url(http::join(base_url, &format!("browse/{}", self.key)))
    }

    /// The GitHub issue this ticket tracks
    ///
    /// Remote links take precedence over URLs mentioned in the description.
    pub fn git_reference(&self, links: &[RemoteLink]) -> Option<IssueRef> {
        links
            .iter()
            .find_map(|link| IssueRef::from_url(&link.object.url))
            .or_else(|| {
                self.fields
                    .description
                    .as_deref()
                    .and_then(IssueRef::find_in_text)
            })
    }
}

/// Read-only client for the Jira REST API
pub struct JiraClient {
    http: Client,
    base_url: String,
    auth: JiraAuth,
}

impl JiraClient {
    pub fn new(base_url: impl Into<String>, auth: JiraAuth, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http::client(timeout)?,
            base_url: base_url.into(),
            auth,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.jira_base_url()?.to_string(),
            JiraAuth::from_config(config)?,
            config.timeout(),
        )
    }

    /// Check that the server is reachable and accepts our credentials
    pub fn connect(&self) -> Result<()> {
        let response = self.request("rest/api/2/myself").send()?;
        http::check(SERVICE, response)?;
        tracing::debug!(base_url = %self.base_url, "connected to Jira");
        Ok(())
    }

    /// Run a JQL search, following pagination to the end
    pub fn search(&self, jql: &str) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut start_at = 0u64;

        loop {
            let page: SearchResponse = self.get_json(self.request("rest/api/2/search").query(&[
                ("jql", jql.to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", PAGE_SIZE.to_string()),
                ("fields", SEARCH_FIELDS.to_string()),
            ]))?;

            let fetched = page.issues.len() as u64;
            tracing::debug!(start_at, fetched, total = page.total, "fetched Jira search page");
            issues.extend(page.issues);

            start_at += fetched;
            if search_done(start_at, fetched, page.total) {
                break;
            }
        }

        Ok(issues)
    }

    pub fn remote_links(&self, key: &str) -> Result<Vec<RemoteLink>> {
        self.get_json(self.request(&format!("rest/api/2/issue/{}/remotelink", key)))
    }

    fn request(&self, path: &str) -> RequestBuilder {
        self.http
            .get(http::join(&self.base_url, path))
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.auth.header_value())
    }

    fn get_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = http::check(SERVICE, builder.send()?)?;
        Ok(response.json()?)
    }
}

/// Stop once everything reported by `total` is in, or the server runs dry
fn search_done(next_start: u64, fetched: u64, total: u64) -> bool {
    fetched == 0 || next_start >= total
}

impl JiraTracker for JiraClient {
    fn linked_issues(&self, jql: &str) -> Result<Vec<LinkedIssue>> {
        self.search(jql)?
            .into_iter()
            .map(|issue| {
                let links = self.remote_links(&issue.key)?;
                Ok(LinkedIssue {
                    link: issue.git_reference(&links),
                    issue: issue.to_record(&self.base_url),
                })
            })
            .collect()
    }
}
