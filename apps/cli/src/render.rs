use std::fmt::Write;

use cvscan_api::diff::{after_pane, before_pane, diff, DiffStats, Segment, SegmentKind};
use cvscan_api::models::AnalysisResult;
use owo_colors::OwoColorize;

const RULE: &str = "────────────────────────────────────────────────────────────";

/// Score, keyword lists and summary of an analysis.
pub fn render_report(analysis: &AnalysisResult, color: bool) -> String {
    let mut out = String::new();
    let score = format!("{}/100", analysis.match_score);
    let score = if !color {
        score
    } else if analysis.match_score >= 80 {
        score.green().bold().to_string()
    } else if analysis.match_score >= 50 {
        score.yellow().bold().to_string()
    } else {
        score.red().bold().to_string()
    };

    let _ = writeln!(out, "Match score: {score}");
    let _ = writeln!(
        out,
        "Target:      {} ({})",
        analysis.hiring_company_or_default(),
        analysis.target_country_or_default()
    );
    let _ = writeln!(out, "Found:       {}", join(&analysis.found_keywords));
    let _ = writeln!(out, "Missing:     {}", join(&analysis.missing_keywords));
    if !analysis.summary.is_empty() {
        let _ = writeln!(out, "\n{}", analysis.summary);
    }
    out
}

fn join<'a>(keywords: impl IntoIterator<Item = &'a String>) -> String {
    let list: Vec<&str> = keywords.into_iter().map(String::as_str).collect();
    if list.is_empty() {
        "-".to_string()
    } else {
        list.join(", ")
    }
}

/// Before and after panes of `original` versus `rewritten`, one below the other.
/// Removed text shows only in the before pane, added text only in the after pane.
pub fn render_panes(original: &str, rewritten: &str, color: bool) -> String {
    let segments = diff(original, rewritten);
    let stats = DiffStats::from_segments(&segments);

    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", heading("BEFORE", color));
    let _ = writeln!(out, "{RULE}");
    out.push_str(&paint(before_pane(&segments), color));
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "{}", heading("AFTER", color));
    let _ = writeln!(out, "{RULE}");
    out.push_str(&paint(after_pane(&segments), color));
    let _ = writeln!(out, "\n{RULE}");

    if stats.is_identical() {
        let _ = writeln!(out, "No changes.");
    } else {
        let _ = writeln!(
            out,
            "{} chars removed, {} chars added, {} unchanged",
            stats.removed, stats.added, stats.unchanged
        );
    }
    out
}

fn heading(label: &str, color: bool) -> String {
    if color {
        label.bold().to_string()
    } else {
        label.to_string()
    }
}

fn paint<'a>(segments: impl Iterator<Item = &'a Segment>, color: bool) -> String {
    let mut out = String::new();
    for segment in segments {
        let text = segment.text.as_str();
        let _ = match (segment.kind, color) {
            (_, false) | (SegmentKind::Unchanged, true) => write!(out, "{text}"),
            (SegmentKind::Removed, true) => write!(out, "{}", text.red().strikethrough()),
            (SegmentKind::Added, true) => write!(out, "{}", text.green().bold()),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            extracted_text: "John Doe".to_string(),
            match_score: 40,
            found_keywords: BTreeSet::from(["Java".to_string()]),
            missing_keywords: BTreeSet::new(),
            summary: "Low match.".to_string(),
            hiring_company_name: Some("Nokia".to_string()),
            target_country: None,
        }
    }

    #[test]
    fn test_plain_report() {
        let report = render_report(&analysis(), false);
        assert!(report.contains("Match score: 40/100"));
        assert!(report.contains("Nokia (International)"));
        assert!(report.contains("Found:       Java"));
        assert!(report.contains("Missing:     -"));
        assert!(report.contains("Low match."));
    }

    #[test]
    fn test_plain_panes_show_each_side() {
        let panes = render_panes("Senior Java Engineer", "Senior Python Engineer", false);
        let (before, after) = panes.split_once("AFTER").unwrap();
        assert!(before.contains("Senior Java Engineer"));
        assert!(after.contains("Senior Python Engineer"));
        assert!(!after.contains("Java"));
        assert!(panes.contains("4 chars removed, 6 chars added"));
    }

    #[test]
    fn test_identical_texts() {
        let panes = render_panes("same", "same", false);
        assert!(panes.contains("No changes."));
    }

    #[test]
    fn test_colored_panes_mark_changes() {
        let panes = render_panes("Java", "Python", true);
        assert!(panes.contains('\u{1b}'));
        assert!(panes.contains("Java"));
        assert!(panes.contains("Python"));
    }
}
