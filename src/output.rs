//! Rendering reconciliation results as JSON, YAML or a colored table

use std::io::IsTerminal;

use clap::ValueEnum;
use colored::{Color, Colorize};

use crate::error::Result;
use crate::issue::{Pair, TypeResults, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

/// Whether to emit ANSI colors, decided once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    /// Colors only when stdout is a terminal and the user didn't opt out
    pub fn detect(no_color: bool) -> Self {
        Self {
            enabled: !no_color && std::io::stdout().is_terminal(),
        }
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn verdict(&self, verdict: Verdict, width: usize) -> String {
        let color = match verdict {
            Verdict::Match => Color::Green,
            Verdict::Mismatch => Color::Red,
        };
        self.paint(&format!("{:<width$}", verdict.label()), color)
    }
}

pub fn render(results: &TypeResults, format: OutputFormat, palette: Palette) -> Result<String> {
    match format {
        OutputFormat::Json => json(results),
        OutputFormat::Yaml => yaml(results),
        OutputFormat::Table => Ok(table(results, palette)),
    }
}

pub fn json(results: &TypeResults) -> Result<String> {
    let mut out = serde_json::to_string_pretty(results)?;
    out.push('\n');
    Ok(out)
}

pub fn yaml(results: &TypeResults) -> Result<String> {
    Ok(format!("---\n{}", serde_yaml::to_string(results)?))
}

/// Human readable report, mismatches first
pub fn table(results: &TypeResults, palette: Palette) -> String {
    let mut out = String::new();

    if results.is_empty() {
        out.push_str("no issues found\n");
        return out;
    }

    out.push_str(&format!(
        "found {} mismatch / {} match issues\n",
        results.mismatches.len(),
        results.matches.len()
    ));

    let rows: Vec<(Verdict, &Pair)> = results
        .mismatches
        .iter()
        .map(|pair| (Verdict::Mismatch, pair))
        .chain(results.matches.iter().map(|pair| (Verdict::Match, pair)))
        .collect();

    let jira_status_width = column_width(&rows, |p| p.jira.status.as_str());
    // the closing paren travels with the git status
    let git_status_width = column_width(&rows, |p| p.git.status.as_str()) + 1;
    let jira_assignee_width = column_width(&rows, |p| p.jira.assignee.as_str());
    let verdict_width = rows
        .iter()
        .map(|(verdict, _)| verdict.label().len())
        .max()
        .unwrap_or(0);

    for (verdict, pair) in rows {
        let name = format!("{}|({})", pair.jira.name, pair.git.name);
        out.push_str(&palette.paint(&name, Color::Yellow));
        out.push('\n');
        out.push_str(&format!(
            "    status ({:<jsw$} | {:<gsw$}  {} assignees({:<jaw$} | {})\n",
            quoted(&pair.jira.status),
            format!("{})", quoted(&pair.git.status)),
            palette.verdict(verdict, verdict_width),
            quoted(&pair.jira.assignee),
            quoted(&pair.git.assignee),
            jsw = jira_status_width,
            gsw = git_status_width,
            jaw = jira_assignee_width,
        ));
    }

    out
}

fn quoted(s: &str) -> String {
    format!("{:?}", s)
}

fn column_width(rows: &[(Verdict, &Pair)], field: fn(&Pair) -> &str) -> usize {
    rows.iter()
        .map(|(_, pair)| quoted(field(pair)).chars().count())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueRecord;

    fn pair(key: &str, jira_status: &str, git_status: &str) -> Pair {
        Pair::new(
            IssueRecord::new(key)
                .with_status(jira_status)
                .with_assignee("jesusr")
                .with_url(format!("https://issues.example.com/browse/{}", key)),
            IssueRecord::new("org/repo#1")
                .with_status(git_status)
                .with_assignee("jmrodri"),
        )
    }

    fn sample() -> TypeResults {
        TypeResults {
            matches: vec![pair("OSDK-1", "To Do", "open"), pair("OSDK-3", "Done", "closed")],
            mismatches: vec![pair("OSDK-2", "In Progress", "closed")],
        }
    }

    #[test]
    fn test_table_empty() {
        let out = table(&TypeResults::default(), Palette::plain());
        assert_eq!(out, "no issues found\n");
    }

    #[test]
    fn test_table_counts_and_order() {
        let out = table(&sample(), Palette::plain());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "found 1 mismatch / 2 match issues");
        assert_eq!(lines[1], "OSDK-2|(org/repo#1)");
        assert!(lines[2].contains("MISMATCH"));
        assert!(lines[2].contains("\"In Progress\""));
        assert_eq!(lines[3], "OSDK-1|(org/repo#1)");
        assert!(lines[4].contains("MATCH "));
        assert_eq!(lines.len(), 7);
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn test_table_count_line_with_only_matches() {
        let results = TypeResults {
            matches: vec![pair("OSDK-1", "To Do", "open")],
            mismatches: vec![],
        };
        let out = table(&results, Palette::plain());
        assert!(out.starts_with("found 0 mismatch / 1 match issues\n"));
    }

    #[test]
    fn test_table_columns_align() {
        let out = table(&sample(), Palette::plain());
        let details: Vec<&str> = out.lines().skip(2).step_by(2).collect();
        assert_eq!(details.len(), 3);

        let columns = |needle: &str| -> Vec<usize> {
            details.iter().map(|line| line.find(needle).unwrap()).collect()
        };
        let found = columns("assignees");
        assert!(found.windows(2).all(|w| w[0] == w[1]), "assignees: {found:?}");

        let verdicts: Vec<usize> = details
            .iter()
            .map(|line| line.find("MISMATCH").or_else(|| line.find("MATCH")).unwrap())
            .collect();
        assert!(verdicts.windows(2).all(|w| w[0] == w[1]), "verdicts: {verdicts:?}");
    }

    #[test]
    fn test_table_closes_status_right_after_git_status() {
        let out = table(&sample(), Palette::plain());

        // "open" is shorter than "closed", the padding goes after the paren
        let line = out.lines().nth(4).unwrap();
        assert!(line.contains("| \"open\")  "), "{line}");
        assert!(!line.contains("\"open\" "), "{line}");
    }

    #[test]
    fn test_json_is_indented() {
        let out = json(&sample()).unwrap();
        assert!(out.starts_with("{\n  \"matches\": ["));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_yaml_has_document_marker() {
        let out = yaml(&sample()).unwrap();
        assert!(out.starts_with("---\n"));
        assert!(out.contains("mismatches:"));
    }

    #[test]
    fn test_json_and_yaml_are_equivalent() {
        let results = sample();

        let from_json: TypeResults = serde_json::from_str(&json(&results).unwrap()).unwrap();
        let from_yaml: TypeResults = serde_yaml::from_str(&yaml(&results).unwrap()).unwrap();

        assert_eq!(from_json, results);
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_render_dispatch() {
        let results = TypeResults::default();
        assert_eq!(
            render(&results, OutputFormat::Table, Palette::plain()).unwrap(),
            "no issues found\n"
        );
        assert!(render(&results, OutputFormat::Json, Palette { enabled: true })
            .unwrap()
            .contains("\"matches\": []"));
    }
}
