use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref GITHUB_ISSUE_URL: Regex =
        Regex::new(r"https?://github\.com/([\w.-]+)/([\w.-]+)/issues/(\d+)\b").unwrap();
}

/// A tracker-neutral view of one issue
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Jira key (e.g., "OSDK-123") or GitHub "owner/repo#number"
    pub name: String,
    /// Status as the tracker reports it (e.g., "In Progress", "open")
    pub status: String,
    /// Assignee display name or login, empty when unassigned
    pub assignee: String,
    /// Web URL of the issue
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

impl IssueRecord {
    /// Creates a record with the given name and empty fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the status and returns self for chaining
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the assignee and returns self for chaining
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = assignee.into();
        self
    }

    /// Sets the URL and returns self for chaining
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Cross-reference key pointing at a GitHub issue
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl IssueRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }

    /// Parse a GitHub issue URL (e.g., "https://github.com/org/repo/issues/12")
    pub fn from_url(url: &str) -> Option<Self> {
        let caps = GITHUB_ISSUE_URL.captures(url.trim())?;
        if caps.get(0)?.start() != 0 {
            return None;
        }
        Self::from_captures(&caps)
    }

    /// Find the first GitHub issue URL anywhere in free text
    pub fn find_in_text(text: &str) -> Option<Self> {
        GITHUB_ISSUE_URL
            .captures_iter(text)
            .find_map(|caps| Self::from_captures(&caps))
    }

    fn from_captures(caps: &regex::Captures<'_>) -> Option<Self> {
        let number = caps[3].parse().ok()?;
        Some(Self::new(&caps[1], &caps[2], number))
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// One logical issue as seen by both trackers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub jira: IssueRecord,
    pub git: IssueRecord,
}

impl Pair {
    pub fn new(jira: IssueRecord, git: IssueRecord) -> Self {
        Self { jira, git }
    }
}

/// Outcome of comparing the two sides of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Match => "MATCH",
            Verdict::Mismatch => "MISMATCH",
        }
    }
}

/// Classified pairs produced by one reconciliation run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeResults {
    pub matches: Vec<Pair>,
    pub mismatches: Vec<Pair>,
}

impl TypeResults {
    /// File a pair under its verdict, keeping arrival order
    pub fn push(&mut self, verdict: Verdict, pair: Pair) {
        match verdict {
            Verdict::Match => self.matches.push(pair),
            Verdict::Mismatch => self.mismatches.push(pair),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.mismatches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_ref_from_url() {
        assert_eq!(
            IssueRef::from_url("https://github.com/operator-framework/operator-sdk/issues/6001"),
            Some(IssueRef::new("operator-framework", "operator-sdk", 6001))
        );
        assert_eq!(
            IssueRef::from_url("https://github.com/org/repo.rs/issues/7#issuecomment-1"),
            Some(IssueRef::new("org", "repo.rs", 7))
        );
        assert_eq!(IssueRef::from_url("https://github.com/org/repo/pull/7"), None);
        assert_eq!(IssueRef::from_url("https://github.com/org/repo/issues/7abc"), None);
        assert_eq!(
            IssueRef::from_url("https://github.com/org/repo/issues/7/"),
            Some(IssueRef::new("org", "repo", 7))
        );
        assert_eq!(IssueRef::from_url("see https://github.com/org/repo/issues/7"), None);
        assert_eq!(IssueRef::from_url("https://issues.example.com/browse/OSDK-1"), None);
    }

    #[test]
    fn test_issue_ref_find_in_text() {
        let text = "Upstream issue:\nhttps://github.com/org/repo/issues/42 and more";
        assert_eq!(
            IssueRef::find_in_text(text),
            Some(IssueRef::new("org", "repo", 42))
        );
        assert_eq!(
            IssueRef::find_in_text("fixed by https://github.com/org/repo/issues/42."),
            Some(IssueRef::new("org", "repo", 42))
        );
        assert_eq!(
            IssueRef::find_in_text("https://github.com/org/repo/issues/42x"),
            None
        );
        assert_eq!(IssueRef::find_in_text("nothing linked"), None);
    }

    #[test]
    fn test_issue_ref_display() {
        assert_eq!(IssueRef::new("org", "repo", 3).to_string(), "org/repo#3");
    }

    #[test]
    fn test_type_results_push_keeps_order() {
        let mut results = TypeResults::default();
        assert!(results.is_empty());

        results.push(
            Verdict::Mismatch,
            Pair::new(IssueRecord::new("A-1"), IssueRecord::new("o/r#1")),
        );
        results.push(
            Verdict::Match,
            Pair::new(IssueRecord::new("A-2"), IssueRecord::new("o/r#2")),
        );
        results.push(
            Verdict::Mismatch,
            Pair::new(IssueRecord::new("A-3"), IssueRecord::new("o/r#3")),
        );

        assert!(!results.is_empty());
        assert_eq!(results.matches.len(), 1);
        assert_eq!(results.mismatches[0].jira.name, "A-1");
        assert_eq!(results.mismatches[1].jira.name, "A-3");
    }

    #[test]
    fn test_record_serialization_omits_empty_url() {
        let record = IssueRecord::new("A-1").with_status("To Do");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("url").is_none());
        assert_eq!(json["assignee"], "");
    }
}
