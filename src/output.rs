use crate::error::{CliError, Result};
use colored::Colorize;
use serde_json::Value;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum Format {
    Json,
    Table,
    Plain,
}

impl Format {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "table" => Ok(Format::Table),
            "plain" => Ok(Format::Plain),
            other => Err(CliError::Config(format!(
                "unknown format '{other}', expected json, table or plain"
            ))),
        }
    }
}

/// Prints `value` as JSON or `key=value` lines. Table output is resource
/// specific and goes through [`Detail`] and [`Columns`] instead; generic
/// values fall back to a key/value listing.
pub fn print_output(value: &Value, format: &Format) {
    match format {
        Format::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            );
        }
        Format::Table => print_table(value),
        Format::Plain => print_plain(value),
    }
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

pub fn print_success(msg: &str) {
    eprintln!("{} {}", "OK".green().bold(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "ERROR".red().bold(), msg);
}

/// Label/value view of a single record.
#[derive(Debug, Default)]
pub struct Detail {
    lines: Vec<String>,
}

impl Detail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, label: &str, value: impl Display) -> Self {
        self.lines.push(format!("{label:20} {value}"));
        self
    }

    /// Adds `title:` followed by the tab-indented `entries`. Nothing is added
    /// when `entries` is empty.
    pub fn section(mut self, title: &str, entries: Vec<String>) -> Self {
        if entries.is_empty() {
            return self;
        }
        self.lines.push(format!("{title}:"));
        self.lines
            .extend(entries.into_iter().map(|entry| format!("\t{entry}")));
        self
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Column listing printed row by row. The header and a blank line go out
/// right before the first row, so an empty listing prints nothing.
pub struct Columns<'a> {
    header: &'a [&'a str],
    widths: &'a [usize],
    started: bool,
}

impl<'a> Columns<'a> {
    /// `widths` pads every column but the last.
    pub fn new(header: &'a [&'a str], widths: &'a [usize]) -> Self {
        Self {
            header,
            widths,
            started: false,
        }
    }

    pub fn line(&self, cells: &[String]) -> String {
        let last = cells.len().saturating_sub(1);
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| match self.widths.get(i) {
                Some(&width) if i < last => format!("{cell:<width$}"),
                _ => cell.clone(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn print_row(&mut self, cells: &[String]) {
        if !self.started {
            let header: Vec<String> = self.header.iter().map(|h| h.to_string()).collect();
            println!("{}", self.line(&header).bold());
            println!();
            self.started = true;
        }
        println!("{}", self.line(cells));
    }
}

/// Text of a possibly-null field; null and missing become the empty string.
pub fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn print_table(value: &Value) {
    match value {
        Value::Object(obj) => {
            let max_key_len = obj.keys().map(|k| k.len()).max().unwrap_or(0);
            for (key, val) in obj {
                println!(
                    "{:>width$}  {}",
                    key.bold(),
                    format_cell(val),
                    width = max_key_len
                );
            }
        }
        Value::Array(items) => {
            for item in items {
                print_table(item);
                println!();
            }
        }
        other => println!("{}", format_cell(other)),
    }
}

fn print_plain(value: &Value) {
    match value {
        Value::String(s) => println!("{s}"),
        Value::Number(n) => println!("{n}"),
        Value::Bool(b) => println!("{b}"),
        Value::Null => println!("null"),
        Value::Array(items) => {
            for item in items {
                print_plain(item);
            }
        }
        Value::Object(obj) => {
            for (key, val) in obj {
                println!("{}={}", key, format_cell(val));
            }
        }
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(a) => format!("[{} items]", a.len()),
        Value::Object(_) => "{...}".to_string(),
    }
}
