//! Output formatting for CLI

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use eval_tracker_core::{Cell as TableCell, ResultTable};
use eval_tracker_workflow::PublishSummary;

/// Line printed once an upload has completed
pub const FINISH_MESSAGE: &str = "Finish Upload.";

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Compact format (tab-separated)
    Compact,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

/// Output writer that handles different formats
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format }
    }

    /// Selected format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write what an upload published
    pub fn write_summary(&self, summary: &PublishSummary) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                print_section(&format!("Run {}", summary.run_id));
                println!("{}", render_table(&summary.table));
                if !summary.blobs.is_empty() {
                    let names: Vec<String> = summary
                        .blobs
                        .iter()
                        .map(|b| format!("{} ({})", b.name, b.type_label()))
                        .collect();
                    print_list_field("Uploaded", &names);
                }
                print_list_field("Excluded from Average", &summary.excluded_tasks);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(summary)?);
            }
            OutputFormat::Yaml => {
                print!("{}", serde_yaml::to_string(summary)?);
            }
            OutputFormat::Compact => {
                println!("{}", compact_lines(&summary.table));
            }
        }
        Ok(())
    }

    /// Print the completion line. Structured formats keep stdout parseable,
    /// so it goes to stderr there.
    pub fn finish_upload(&self) {
        match self.format {
            OutputFormat::Table => println!("{} {}", "✓".green(), FINISH_MESSAGE),
            OutputFormat::Compact => println!("{}", FINISH_MESSAGE),
            OutputFormat::Json | OutputFormat::Yaml => eprintln!("{}", FINISH_MESSAGE),
        }
    }

    /// Write a warning message
    pub fn warning(&self, message: &str) {
        if self.format == OutputFormat::Table {
            eprintln!("{} {}", "⚠".yellow(), message);
        } else {
            eprintln!("Warning: {}", message);
        }
    }

    /// Start a spinner for long operations
    pub fn spinner(&self, message: &str) -> Option<indicatif::ProgressBar> {
        if self.format != OutputFormat::Table {
            return None;
        }

        let pb = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    }
}

/// Render the leaderboard table with one header row
pub fn render_table(table: &ResultTable) -> Table {
    let mut rendered = Table::new();
    rendered.load_preset(UTF8_FULL);
    rendered.apply_modifier(UTF8_ROUND_CORNERS);

    rendered.set_header(
        table
            .columns()
            .iter()
            .map(|c| Cell::new(c).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    for row in table.data() {
        rendered.add_row(row.iter().map(format_cell).collect::<Vec<_>>());
    }
    rendered
}

/// Header line and one tab-separated line per row
pub fn compact_lines(table: &ResultTable) -> String {
    let mut lines = vec![table.columns().join("\t")];
    for row in table.data() {
        lines.push(
            row.iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("\t"),
        );
    }
    lines.join("\n")
}

fn format_cell(cell: &TableCell) -> Cell {
    match cell {
        TableCell::Number(v) if !v.is_nan() => Cell::new(format!("{:.4}", v)),
        TableCell::Integer(v) => Cell::new(v),
        TableCell::Text(v) => Cell::new(v),
        _ => Cell::new("-").fg(Color::DarkGrey),
    }
}

/// Print a list field
pub fn print_list_field(key: &str, values: &[String]) {
    if values.is_empty() {
        println!("  {}: {}", key.cyan(), "-".dimmed());
    } else {
        println!("  {}:", key.cyan());
        for v in values {
            println!("    - {}", v);
        }
    }
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", title.bold().underline());
}
