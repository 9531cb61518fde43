//! Status compatibility rules
//!
//! A workflow file declares which Jira status is considered in sync with
//! which GitHub issue state:
//!
//! ```yaml
//! name: default
//! rules:
//!   - jira: To Do
//!     github: open
//!   - jira: Closed
//!     github: open
//!     compatible: false
//! ```
//!
//! Statuses are compared trimmed and case-insensitively. A status pair with
//! no rule is never compatible.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::issue::{Pair, Verdict};

/// Workflow file used when none is given on the command line
pub const DEFAULT_WORKFLOW_FILE: &str = "workflows.yaml";

/// A single status mapping between the two trackers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowRule {
    pub jira: String,
    pub github: String,
    #[serde(default = "default_compatible")]
    pub compatible: bool,
}

fn default_compatible() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkflowFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    rules: Vec<WorkflowRule>,
}

/// Loaded rule set, indexed by normalized status pair
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    name: String,
    rules: HashMap<(String, String), bool>,
}

impl Workflow {
    /// Open and parse a workflow file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::WorkflowFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Parse a workflow document from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let file: WorkflowFile = serde_yaml::from_reader(reader).map_err(Error::WorkflowParse)?;
        Self::from_rules(file.name, file.rules)
    }

    /// Build a workflow from rules, rejecting blank statuses and contradictions
    pub fn from_rules(name: impl Into<String>, rules: Vec<WorkflowRule>) -> Result<Self> {
        let mut index = HashMap::with_capacity(rules.len());

        for rule in rules {
            let key = (normalize(&rule.jira), normalize(&rule.github));
            if key.0.is_empty() || key.1.is_empty() {
                return Err(Error::InvalidWorkflow(format!(
                    "rule ({:?}, {:?}) has an empty status",
                    rule.jira, rule.github
                )));
            }

            match index.get(&key) {
                Some(&existing) if existing != rule.compatible => {
                    return Err(Error::InvalidWorkflow(format!(
                        "conflicting rules for jira status {:?} and github status {:?}",
                        rule.jira, rule.github
                    )));
                }
                _ => {
                    index.insert(key, rule.compatible);
                }
            }
        }

        Ok(Self {
            name: name.into(),
            rules: index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a Jira status and a GitHub state are considered in sync
    pub fn compatible(&self, jira_status: &str, github_status: &str) -> bool {
        self.rules
            .get(&(normalize(jira_status), normalize(github_status)))
            .copied()
            .unwrap_or(false)
    }

    /// Classify a pair under this workflow
    pub fn classify(&self, pair: &Pair) -> Verdict {
        if self.compatible(&pair.jira.status, &pair.git.status) {
            Verdict::Match
        } else {
            Verdict::Mismatch
        }
    }
}

fn normalize(status: &str) -> String {
    status.trim().to_lowercase()
}
