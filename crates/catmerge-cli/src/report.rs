use colored::Colorize;

use catmerge_diff::{diff_text, DiffLine};
use catmerge_merge::{ConflictLabels, ConflictRecord};

use crate::cli::OutputFormat;
use crate::driver::{DriverOutcome, ExitStatus};

/// User-facing output of the merge command, gated by verbosity.
pub struct Reporter {
    verbosity: u8,
    format: OutputFormat,
}

impl Reporter {
    pub fn new(verbosity: u8, format: OutputFormat) -> Self {
        Self { verbosity, format }
    }

    pub fn file_header(&self, display: &str) {
        if self.verbosity >= 1 && self.format == OutputFormat::Text {
            println!("{} {}", "Merging".bold(), display.cyan());
        }
    }

    pub fn outcome(&self, outcome: &DriverOutcome, labels: &ConflictLabels) -> anyhow::Result<()> {
        if self.verbosity < 2 {
            return Ok(());
        }
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            }
            OutputFormat::Text => {
                if outcome.status == ExitStatus::Clean {
                    println!("{} merged cleanly", "✓".green());
                }
                for record in &outcome.report.conflicts {
                    print!("{}", render_excerpt(record, labels));
                }
                if outcome.status == ExitStatus::Conflicts && outcome.report.conflicts.is_empty() {
                    // Markers carried in from an input.
                    for key in &outcome.unresolved {
                        println!("{} {}", "conflict:".red().bold(), key);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Text excerpt of one conflict: the key, then a line diff from the local
/// variant to the other one for each value slot that differs.
pub fn render_excerpt(record: &ConflictRecord, labels: &ConflictLabels) -> String {
    let mut out = format!("{} {}\n", "conflict:".red().bold(), record.key());
    let slots = record.local.len().max(record.other.len());
    for i in 0..slots {
        let local = record.local.get(i).map_or("", String::as_str);
        let other = record.other.get(i).map_or("", String::as_str);
        let diff = diff_text(local, other, 1);
        if diff.is_empty() {
            continue;
        }
        if slots > 1 {
            out.push_str(&format!("  [{i}]\n"));
        }
        for line in diff.lines() {
            let rendered = match line {
                DiffLine::Context(text) => format!("    {text}").normal(),
                DiffLine::Removed(text) => format!("  - {text}  ({})", labels.local).red(),
                DiffLine::Added(text) => format!("  + {text}  ({})", labels.other).green(),
            };
            out.push_str(&format!("{rendered}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(local: &[&str], other: &[&str]) -> ConflictRecord {
        ConflictRecord {
            context: None,
            msgid: "k1".into(),
            local: local.iter().map(|s| s.to_string()).collect(),
            other: other.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn excerpt_shows_both_variants() {
        colored::control::set_override(false);
        let text = render_excerpt(&record(&["Hi"], &["Hey"]), &ConflictLabels::default());
        assert_eq!(text, "conflict: k1\n  - Hi  (local)\n  + Hey  (other)\n");
    }

    #[test]
    fn excerpt_skips_equal_plural_slots() {
        colored::control::set_override(false);
        let text = render_excerpt(
            &record(&["Datei", "Dateien"], &["Datei", "Akten"]),
            &ConflictLabels::default(),
        );
        assert!(!text.contains("[0]"));
        assert!(text.contains("  [1]\n  - Dateien  (local)\n  + Akten  (other)\n"));
    }
}
