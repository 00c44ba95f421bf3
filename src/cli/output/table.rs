//! Table output formatting for CLI commands
//!
//! Iteration summaries rendered with comfy-table. Scores are color-coded
//! against the quality threshold when the terminal supports it.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::IterationRecord;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One row per iteration: prompt version, score spread and feedback size.
    pub fn format_iterations(&self, records: &[IterationRecord], threshold: Option<f64>) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Iteration").add_attribute(Attribute::Bold),
            Cell::new("Prompt").add_attribute(Attribute::Bold),
            Cell::new("Mean").add_attribute(Attribute::Bold),
            Cell::new("Min").add_attribute(Attribute::Bold),
            Cell::new("Max").add_attribute(Attribute::Bold),
            Cell::new("Pros").add_attribute(Attribute::Bold),
            Cell::new("Cons").add_attribute(Attribute::Bold),
        ]);

        for record in records {
            let (min, max) = score_range(&record.scores);
            let mean = format!("{:.2}", record.mean_score);

            let mean_cell = match threshold {
                Some(threshold) if self.use_colors => {
                    let color = if record.mean_score >= threshold {
                        Color::Green
                    } else {
                        Color::Yellow
                    };
                    Cell::new(mean).fg(color)
                }
                _ => Cell::new(mean),
            };

            table.add_row(vec![
                Cell::new(record.iteration).set_alignment(CellAlignment::Right),
                Cell::new(format!("v{}", record.prompt_version)),
                mean_cell.set_alignment(CellAlignment::Right),
                Cell::new(format!("{min:.1}")).set_alignment(CellAlignment::Right),
                Cell::new(format!("{max:.1}")).set_alignment(CellAlignment::Right),
                Cell::new(record.distinct_pros).set_alignment(CellAlignment::Right),
                Cell::new(record.distinct_cons).set_alignment(CellAlignment::Right),
            ]);
        }

        table.to_string()
    }

    /// Create a base table with common settings
    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn score_range(scores: &[f64]) -> (f64, f64) {
    scores
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        })
}

/// Check if the terminal supports colors
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}
