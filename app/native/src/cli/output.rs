//! Terminal formatting shared by the CLI commands.
//!
//! JSON reports are printed with colored keys and scalars; tables use the
//! helpers below to keep paths and markers compact.

use std::fmt::Write as _;

use colored::{Color, Colorize};

/// Path column width used by the rule and image tables.
pub const PATH_COLUMN_WIDTH: usize = 60;

/// Prints a JSON value pretty-printed, colored when the terminal allows it.
pub fn print_highlighted_json(value: &serde_json::Value) {
    println!("{}", highlight_json(value, colored::control::SHOULD_COLORIZE.should_colorize()));
}

/// Renders a JSON value with the same layout as `serde_json::to_string_pretty`.
///
/// Keys are cyan, strings green, numbers yellow, booleans and `null` magenta.
#[must_use]
pub fn highlight_json(value: &serde_json::Value, color: bool) -> String {
    let mut out = String::new();
    write_json(&mut out, value, 0, color);
    out
}

fn write_json(out: &mut String, value: &serde_json::Value, depth: usize, color: bool) {
    use serde_json::Value;

    let paint = |text: String, hue: Color| {
        if color { text.as_str().color(hue).to_string() } else { text }
    };
    let indent = |depth: usize| "  ".repeat(depth);

    match value {
        Value::Null => out.push_str(&paint("null".to_string(), Color::Magenta)),
        Value::Bool(b) => out.push_str(&paint(b.to_string(), Color::Magenta)),
        Value::Number(n) => out.push_str(&paint(n.to_string(), Color::Yellow)),
        Value::String(s) => out.push_str(&paint(quoted(s), Color::Green)),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(fields) if fields.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (index, item) in items.iter().enumerate() {
                out.push_str(&indent(depth + 1));
                write_json(out, item, depth + 1, color);
                out.push_str(if index + 1 < items.len() { ",\n" } else { "\n" });
            }
            let _ = write!(out, "{}]", indent(depth));
        }
        Value::Object(fields) => {
            out.push_str("{\n");
            for (index, (key, field)) in fields.iter().enumerate() {
                let _ = write!(out, "{}{}: ", indent(depth + 1), paint(quoted(key), Color::Cyan));
                write_json(out, field, depth + 1, color);
                out.push_str(if index + 1 < fields.len() { ",\n" } else { "\n" });
            }
            let _ = write!(out, "{}}}", indent(depth));
        }
    }
}

fn quoted(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

/// Shortens a vault path to `max_chars`, keeping the end so the file name stays visible.
#[must_use]
pub fn truncate_path(path: &str, max_chars: usize) -> String {
    let len = path.chars().count();
    if len <= max_chars {
        return path.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }
    let tail: String = path.chars().skip(len - (max_chars - 1)).collect();
    format!("…{tail}")
}

/// Formats a byte count with a binary unit (`B`, `KB`, `MB`).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// Marks whether a banner image exists in the vault.
#[must_use]
pub fn format_exists(exists: bool) -> String {
    if exists { "✓".green().to_string() } else { "missing".red().to_string() }
}
