//! # Output
//!
//! Rendering of findings for people and for machines.
//!
//! Each finding is printed as a coloured `error:` or `warning:` label
//! followed by its report as YAML, and a run ends with an `errors: N` line
//! counting the findings at [`Level::Error`]. With `--file`, every finding is
//! also appended to a file as one JSON object per line.
//!
//! ## Colour
//!
//! `--color always` and `--color never` win outright. With `auto`, labels are
//! plain when `NO_COLOR` is set at all, when `CLICOLOR=0` or when
//! `TERM=dumb`; `CLICOLOR_FORCE` turns colour on for a redirected stderr.
//! Otherwise colour follows whether stderr is a terminal.

use std::env;
use std::io::Write;

use console::style;

use crate::error::Result;
use crate::validation::{Level, ValidationError};

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the `--color` flag against the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether stderr, where findings go, supports color.
    fn detect_color_support() -> bool {
        // set, even empty, means off
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stderr().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// The label printed before a finding of `level`.
    pub fn label(&self, level: Level) -> String {
        let text = match level {
            Level::Error => "error: ",
            Level::Warning => "warning: ",
            Level::Info => "info: ",
        };
        let styled = match level {
            Level::Error => style(text).red(),
            Level::Warning => style(text).yellow(),
            Level::Info => style(text).cyan(),
        };
        styled.force_styling(self.use_color).to_string()
    }

    /// Marker printed before an environment fault.
    pub fn internal_error(&self) -> String {
        style("INTERNAL ERROR")
            .red()
            .bold()
            .force_styling(self.use_color)
            .to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Label line followed by the finding's report as YAML.
pub fn render_finding(config: &OutputConfig, error: &ValidationError) -> Result<String> {
    let yaml = serde_yaml::to_string(&error.report())?;
    Ok(format!("{}\n{}", config.label(error.level()), yaml.trim_end()))
}

/// Findings that fail the run.
pub fn error_count<'a>(errors: impl IntoIterator<Item = &'a ValidationError>) -> usize {
    errors
        .into_iter()
        .filter(|e| e.level() == Level::Error)
        .count()
}

pub fn render_summary(errors: usize) -> String {
    format!("errors: {errors}")
}

/// Writes findings as JSON lines.
pub struct JsonLinesWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesWriter { writer }
    }

    pub fn write(&mut self, error: &ValidationError) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &error.report())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
