use colored::Color;

use crate::github::Issue;
use crate::output::Palette;

/// Render open GitHub issues one per line with their triage details
pub fn render(issues: &[Issue], palette: Palette) -> String {
    if issues.is_empty() {
        return "no issues found\n".to_string();
    }

    let number_width = issues
        .iter()
        .map(|issue| issue.number.to_string().len() + 1)
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for issue in issues {
        let number = format!("{:>number_width$}", format!("#{}", issue.number));
        out.push_str(&palette.paint(&number, Color::Yellow));
        out.push(' ');
        out.push_str(&issue.title);

        let assignee = issue.assignee_login();
        if !assignee.is_empty() {
            out.push_str(&format!(" @{}", palette.paint(assignee, Color::Cyan)));
        }

        if !issue.labels.is_empty() {
            let labels: Vec<&str> = issue.labels.iter().map(|l| l.name.as_str()).collect();
            out.push_str(&format!(" [{}]", labels.join(", ")));
        }

        if let Some(milestone) = &issue.milestone {
            out.push_str(&format!(" ({})", palette.paint(&milestone.title, Color::Green)));
        }

        out.push('\n');
    }

    out
}
