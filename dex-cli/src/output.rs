//! Output abstraction for testable printing
//!
//! Command handlers write through [`Output`] so tests can capture what would
//! have been printed.

use serde::Serialize;

use crate::error::CliResult;

/// How results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub trait Output: Send + Sync {
    fn print(&self, msg: &str) -> CliResult<()>;

    fn error(&self, msg: &str) -> CliResult<()>;

    fn success(&self, msg: &str) -> CliResult<()> {
        self.print(&format!("✅ {}", msg))
    }

    fn warning(&self, msg: &str) -> CliResult<()> {
        self.print(&format!("⚠️  {}", msg))
    }

    fn info(&self, msg: &str) -> CliResult<()> {
        self.print(&format!("ℹ️  {}", msg))
    }

    fn header(&self, title: &str) -> CliResult<()> {
        self.print(&format!("\n{}\n{}", title, "=".repeat(title.chars().count())))
    }

    /// Aligned `key value` lines
    fn rows(&self, rows: &[(&str, String)]) -> CliResult<()> {
        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in rows {
            self.print(&format!("{:<width$}  {}", key, value, width = width))?;
        }
        Ok(())
    }
}

/// Render `value` as pretty JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn print(&self, msg: &str) -> CliResult<()> {
        println!("{}", msg);
        Ok(())
    }

    fn error(&self, msg: &str) -> CliResult<()> {
        eprintln!("❌ {}", msg);
        Ok(())
    }
}
