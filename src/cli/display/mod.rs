//! Display framework for CLI output formatting.
//!
//! Shared primitives for colors, tables and number formatting used by every
//! command's human-readable output.

pub mod colors;
pub mod format;
pub mod table;

use serde::Serialize;

pub use colors::*;
pub use format::*;
pub use table::*;

/// Trait for types that can be rendered as human-readable or JSON output.
pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Dispatch output based on JSON mode flag.
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_json()).unwrap_or_default()
        );
    } else {
        println!("{}", result.to_human());
    }
}

/// Render a section heading.
pub fn heading(title: &str) -> String {
    format!("{}", console::style(title).bold().underlined())
}
