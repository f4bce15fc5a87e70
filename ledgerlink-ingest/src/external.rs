//! Statement parser invoked as an external process.
//!
//! The parser prints a single JSON document on stdout:
//!   {"transactions": [...], "file_results": [...], "summary": {...}}
//! Anything else (non-zero exit, bad JSON) is an error for the whole run.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::ParseOutput;

/// How to launch the parser. Statement and config paths are appended as
/// absolute paths, followed by `--format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Default for ParserCommand {
    fn default() -> Self {
        Self {
            program: "uv".to_string(),
            args: vec!["run".to_string(), "python".to_string(), "main.py".to_string()],
            working_dir: Some(PathBuf::from("rbc-statement-parser")),
        }
    }
}

impl ParserCommand {
    /// Full argv after the program name.
    pub fn argv(&self, statements: &Path, config: Option<&Path>) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.push(statements.display().to_string());
        argv.push("--format".to_string());
        argv.push("json".to_string());
        if let Some(cfg) = config {
            argv.push("--config".to_string());
            argv.push(cfg.display().to_string());
        }
        argv
    }

    pub async fn run(&self, statements: &Path, config: Option<&Path>) -> Result<ParseOutput> {
        // The parser runs from its own directory, so relative paths would break.
        let statements = absolute(statements)?;
        let config = config.map(absolute).transpose()?;
        let argv = self.argv(&statements, config.as_deref());

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&argv).stdin(std::process::Stdio::null());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(program = %self.program, ?argv, "running statement parser");
        let out = cmd
            .output()
            .await
            .with_context(|| format!("spawning {} {:?}", self.program, argv))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            bail!("statement parser exited with {}. stderr: {}", out.status, stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&out.stdout);
        parse_output(&stdout)
    }
}

/// Decode the parser's stdout.
pub fn parse_output(stdout: &str) -> Result<ParseOutput> {
    serde_json::from_str(stdout.trim()).context("parse statement parser JSON output")
}

fn absolute(p: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(p).with_context(|| format!("resolve {}", p.display()))
}
