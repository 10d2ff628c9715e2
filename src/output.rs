//! Output formatters for diagnostics

use crate::types::{Diagnostic, Severity};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `file:line:col: [HT002] message` with colors
    #[default]
    Text,
    /// `file:line:col: HT002 message`, no colors
    Concise,
    /// One JSON array for the whole run
    Json,
    /// GitHub Actions workflow commands
    Github,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "full" => Ok(Self::Text),
            "concise" => Ok(Self::Concise),
            "json" => Ok(Self::Json),
            "github" => Ok(Self::Github),
            other => Err(format!("Unknown output format '{other}'. Expected text, concise, json or github")),
        }
    }
}

impl OutputFormat {
    pub fn create_formatter(self) -> Box<dyn OutputFormatter> {
        match self {
            Self::Text => Box::new(TextFormatter),
            Self::Concise => Box::new(ConciseFormatter),
            Self::Json => Box::new(JsonFormatter),
            Self::Github => Box::new(GithubFormatter),
        }
    }
}

pub trait OutputFormatter: Send + Sync {
    /// Format the diagnostics of one file. Empty when there is nothing to print.
    fn format_warnings(&self, warnings: &[Diagnostic], file_path: &str) -> String;

    /// Whether output is buffered and emitted once via [`format_json_report`]
    fn is_batched(&self) -> bool {
        false
    }
}

pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn format_warnings(&self, warnings: &[Diagnostic], file_path: &str) -> String {
        warnings
            .iter()
            .map(|w| {
                let code = format!("[{}]", w.rule_code());
                let code = match w.severity {
                    Severity::Error => code.red(),
                    Severity::Warning => code.yellow(),
                };
                format!(
                    "{}:{}:{}: {} {} {}",
                    file_path.blue().underline(),
                    w.line.to_string().cyan(),
                    w.column.to_string().cyan(),
                    code,
                    w.message,
                    format!("({})", w.category).dimmed()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct ConciseFormatter;

impl OutputFormatter for ConciseFormatter {
    fn format_warnings(&self, warnings: &[Diagnostic], file_path: &str) -> String {
        warnings
            .iter()
            .map(|w| format!("{file_path}:{}:{}: {} {}", w.line, w.column, w.rule_code(), w.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    file: &'a str,
    rule: &'static str,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

impl OutputFormatter for JsonFormatter {
    fn format_warnings(&self, warnings: &[Diagnostic], file_path: &str) -> String {
        format_json_report(&[(file_path.to_string(), warnings.to_vec())])
    }

    fn is_batched(&self) -> bool {
        true
    }
}

/// Serialize the diagnostics of a whole run as one JSON array
pub fn format_json_report(results: &[(String, Vec<Diagnostic>)]) -> String {
    let entries: Vec<JsonDiagnostic> = results
        .iter()
        .flat_map(|(file, diagnostics)| {
            diagnostics.iter().map(move |diagnostic| JsonDiagnostic {
                file,
                rule: diagnostic.rule_code(),
                diagnostic,
            })
        })
        .collect();
    serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
}

pub struct GithubFormatter;

/// Escape data for a workflow command, per the `::` command syntax
fn escape_github(value: &str) -> String {
    value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_github_property(value: &str) -> String {
    escape_github(value).replace(':', "%3A").replace(',', "%2C")
}

impl OutputFormatter for GithubFormatter {
    fn format_warnings(&self, warnings: &[Diagnostic], file_path: &str) -> String {
        warnings
            .iter()
            .map(|w| {
                let level = match w.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                let end_column = w.column + w.length.max(1);
                format!(
                    "::{level} file={},line={},col={},endColumn={},title={}::{}",
                    escape_github_property(file_path),
                    w.line,
                    w.column,
                    end_column,
                    escape_github_property(&format!("{} {}", w.rule_code(), w.category)),
                    escape_github(&w.message)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Write formatted output to stdout as one locked write
pub fn write_line(content: &str) -> io::Result<()> {
    let mut handle = io::stdout().lock();
    writeln!(handle, "{content}")
}
