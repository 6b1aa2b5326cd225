use crate::{cli::OutputFormat, error::Result};
#[cfg(feature = "colored-output")]
use colored::*;
use serde_json::Value;

pub struct OutputManager {
    format: OutputFormat,
    colored: bool,
}

impl OutputManager {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { format, colored }
    }

    pub fn format_value(&self, value: &Value) -> Result<String> {
        match self.format {
            OutputFormat::Pretty => Ok(self.format_pretty(value)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::JsonCompact => Ok(serde_json::to_string(value)?),
        }
    }

    pub fn print_value(&self, value: &Value) -> Result<()> {
        println!("{}", self.format_value(value)?);
        Ok(())
    }

    /// A one-line confirmation; JSON formats get `{"status":"ok","message":...}`.
    pub fn print_success(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Pretty => println!("{} {}", self.colorize("✓", true), message),
            _ => self.print_value(&serde_json::json!({ "status": "ok", "message": message }))?,
        }
        Ok(())
    }

    fn format_pretty(&self, value: &Value) -> String {
        let mut output = String::new();
        self.write_pretty(&mut output, value, 0);
        output.trim_end().to_string()
    }

    fn write_pretty(&self, out: &mut String, value: &Value, depth: usize) {
        let indent = "  ".repeat(depth);
        match value {
            Value::Object(map) if map.is_empty() => out.push_str(&format!("{indent}(empty)\n")),
            Value::Object(map) => {
                for (key, value) in map {
                    if is_scalar(value) {
                        out.push_str(&format!(
                            "{indent}{}: {}\n",
                            self.colorize(key, false),
                            scalar_text(value)
                        ));
                    } else {
                        out.push_str(&format!("{indent}{}:\n", self.colorize(key, false)));
                        self.write_pretty(out, value, depth + 1);
                    }
                }
            }
            Value::Array(items) if items.is_empty() => out.push_str(&format!("{indent}(none)\n")),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if is_scalar(item) {
                        out.push_str(&format!("{indent}- {}\n", scalar_text(item)));
                    } else {
                        out.push_str(&format!(
                            "{indent}{}\n",
                            self.colorize(&format!("[{}]", index + 1), true)
                        ));
                        self.write_pretty(out, item, depth + 1);
                    }
                }
            }
            scalar => out.push_str(&format!("{indent}{}\n", scalar_text(scalar))),
        }
    }

    #[cfg(feature = "colored-output")]
    fn colorize(&self, text: &str, strong: bool) -> String {
        if !self.colored {
            return text.to_string();
        }
        if strong {
            text.green().bold().to_string()
        } else {
            text.yellow().to_string()
        }
    }

    #[cfg(not(feature = "colored-output"))]
    fn colorize(&self, text: &str, _strong: bool) -> String {
        let _ = self.colored;
        text.to_string()
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
