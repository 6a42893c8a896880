//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use celltyper_domain::LabelResult;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format labels, one per group, in group order.
    pub fn format_labels(&self, labels: &[LabelResult]) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(self.format_labels_text(labels)),
            OutputFormat::Table => Ok(self.format_labels_table(labels)),
            OutputFormat::Json => self.format_labels_json(labels),
        }
    }

    fn format_labels_text(&self, labels: &[LabelResult]) -> String {
        labels
            .iter()
            .map(|l| format!("{}\t{}", l.group_id, l.label))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_labels_table(&self, labels: &[LabelResult]) -> String {
        if labels.is_empty() {
            return self.colorize("No groups to annotate.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Group", "Cell type"]);
        for label in labels {
            builder.push_record([label.group_id.as_str(), label.label.as_str()]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn format_labels_json(&self, labels: &[LabelResult]) -> Result<String> {
        let json_labels: Vec<serde_json::Value> = labels
            .iter()
            .map(|l| {
                serde_json::json!({
                    "group_id": l.group_id,
                    "label": l.label,
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json_labels)?)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format a notice (prompt-only mode, review reminder).
    pub fn notice(&self, message: &str) -> String {
        self.colorize(message, "cyan")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
