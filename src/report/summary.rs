//! Per-day guest list summary

use std::path::PathBuf;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::DayBuckets;
use crate::report::WrittenDay;

/// Counts for one day bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    pub ticket_type: String,
    pub direct: usize,
    pub all_days: usize,
    pub output: Option<PathBuf>,
}

impl DayRow {
    pub fn total(&self) -> usize {
        self.direct + self.all_days
    }
}

/// Summary of a guest list run
#[derive(Debug, Default)]
pub struct GuestlistSummary {
    pub source_records: usize,
    pub rows: Vec<DayRow>,
    pub commands_file: Option<PathBuf>,
}

impl GuestlistSummary {
    pub fn new(source_records: usize, days: &DayBuckets) -> Self {
        let rows = days
            .iter()
            .map(|b| DayRow {
                ticket_type: b.ticket_type.clone(),
                direct: b.direct_count(),
                all_days: b.replicated_count(),
                output: None,
            })
            .collect();
        Self {
            source_records,
            rows,
            commands_file: None,
        }
    }

    /// Attach output paths to the matching rows.
    pub fn set_outputs(&mut self, written: &[WrittenDay]) {
        for w in written {
            if let Some(row) = self.rows.iter_mut().find(|r| r.ticket_type == w.ticket_type) {
                row.output = Some(w.path.clone());
            }
        }
    }

    pub fn set_commands_file(&mut self, path: PathBuf) {
        self.commands_file = Some(path);
    }

    pub fn total_guests(&self) -> usize {
        self.rows.iter().map(DayRow::total).sum()
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Ticket Type").add_attribute(Attribute::Bold),
            Cell::new("Direct").add_attribute(Attribute::Bold),
            Cell::new("All-Days").add_attribute(Attribute::Bold),
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new("Output").add_attribute(Attribute::Bold),
        ]);

        for row in &self.rows {
            table.add_row(vec![
                Cell::new(&row.ticket_type),
                Cell::new(row.direct),
                Cell::new(row.all_days).fg(if row.all_days == 0 {
                    Color::White
                } else {
                    Color::Cyan
                }),
                Cell::new(row.total())
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
                Cell::new(
                    row.output
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
        }
        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("GUEST LIST SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!(
            "      {} source record(s), {} day(s), {} guest entries",
            style(self.source_records).yellow().bold(),
            style(self.rows.len()).yellow().bold(),
            style(self.total_guests()).yellow().bold()
        );
        println!();

        // Indent the table
        for line in self.table().to_string().lines() {
            println!("    {}", line);
        }

        if let Some(path) = &self.commands_file {
            println!();
            println!(
                "      {} {}",
                style("Upload commands:").yellow(),
                style(path.display()).dim()
            );
        }
    }
}
