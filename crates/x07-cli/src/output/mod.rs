//! Terminal output formatting.
//!
//! Text goes to stdout; `--json` output is canonical JSON (sorted keys,
//! trailing newline) so it diffs cleanly.

pub mod colors;
pub mod errors;

use serde::Serialize;
use x07_core::utils::canonical_json;

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
        }
    }

    /// Print a plain line
    pub fn line(&self, message: &str) {
        println!("{}", message);
    }

    pub fn lines<I>(&self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        for line in lines {
            self.line(&line);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.colors.dim(message));
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// Print `value` as canonical JSON
    pub fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let value = serde_json::to_value(value)?;
        print!("{}", canonical_json(&value)?);
        Ok(())
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
