//! Raw source execution.
//!
//! A probe runs exactly one source once and hands back whatever text it
//! produced. Every failure is folded into the result as a [`ProbeError`] so
//! the caller can keep merging whatever the other sources returned.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::catalog::SourceId;
use crate::error::ProbeError;

/// One concrete telemetry source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: SourceId,
    pub kind: SourceKind,
}

/// How a source is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// External process; stdout is the result. Runs with `LC_ALL=C`.
    Command { program: String, args: Vec<String> },
    /// PowerShell snippet run through the given executable.
    PowerShell { program: String, script: String },
    /// Whole-file read.
    File(PathBuf),
    /// Reads `dir/<key>` for every key and emits `key: value` lines.
    KeyedFiles {
        dir: PathBuf,
        keys: Vec<&'static str>,
    },
    /// Newline-joined entry names of a directory.
    DirListing(PathBuf),
    /// Succeeds with the first path that exists.
    Exists(Vec<PathBuf>),
}

/// Outcome of probing one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProbeResult {
    pub source_id: SourceId,
    pub outcome: Result<String, ProbeError>,
}

impl RawProbeResult {
    pub fn ok(source_id: SourceId, text: impl Into<String>) -> Self {
        Self {
            source_id,
            outcome: Ok(text.into()),
        }
    }

    pub fn failed(source_id: SourceId, error: ProbeError) -> Self {
        Self {
            source_id,
            outcome: Err(error),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Raw text, or `None` when the probe failed.
    pub fn text(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }
}

/// Executes sources.
pub trait Probe: Send + Sync + 'static {
    /// Runs `source` once. Never fails; errors are part of the result.
    fn probe(&self, source: &Source) -> impl Future<Output = RawProbeResult> + Send;
}

/// Probe backed by real processes and the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl Probe for SystemProbe {
    async fn probe(&self, source: &Source) -> RawProbeResult {
        let outcome = match &source.kind {
            SourceKind::Command { program, args } => run_command(program, args).await,
            SourceKind::PowerShell { program, script } => run_powershell(program, script).await,
            SourceKind::File(path) => read_file(path).await,
            SourceKind::KeyedFiles { dir, keys } => read_keyed_files(dir, keys).await,
            SourceKind::DirListing(path) => list_dir(path).await,
            SourceKind::Exists(paths) => first_existing(paths).await,
        };

        if let Err(e) = &outcome {
            tracing::debug!(source = ?source.id, error = %e, "probe failed");
        }

        RawProbeResult {
            source_id: source.id,
            outcome,
        }
    }
}

// ---------------------------------------------------------------------------
// Source runners
// ---------------------------------------------------------------------------

async fn run_command(program: &str, args: &[String]) -> Result<String, ProbeError> {
    let output = tokio::process::Command::new(program)
        .args(args)
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| ProbeError::Spawn {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ProbeError::ExitStatus {
            program: program.to_string(),
            status: output.status.to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| ProbeError::Encoding {
        origin: program.to_string(),
    })
}

async fn run_powershell(program: &str, script: &str) -> Result<String, ProbeError> {
    let command = format!("[Console]::OutputEncoding = [System.Text.Encoding]::UTF8; {script}");
    let args = [
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-Command".to_string(),
        command,
    ];
    run_command(program, &args).await
}

async fn read_file(path: &Path) -> Result<String, ProbeError> {
    let bytes = tokio::fs::read(path).await.map_err(read_error(path))?;
    String::from_utf8(bytes).map_err(|_| ProbeError::Encoding {
        origin: path.display().to_string(),
    })
}

async fn read_keyed_files(dir: &Path, keys: &[&'static str]) -> Result<String, ProbeError> {
    let mut out = String::new();
    let mut found = 0usize;
    for key in keys {
        // Unreadable keys (root-only serials) are skipped, not fatal.
        if let Ok(value) = tokio::fs::read_to_string(dir.join(key)).await {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value.trim());
            out.push('\n');
            found += 1;
        }
    }
    if found == 0 {
        return Err(ProbeError::Empty {
            origin: dir.display().to_string(),
        });
    }
    Ok(out)
}

async fn list_dir(path: &Path) -> Result<String, ProbeError> {
    let mut entries = tokio::fs::read_dir(path).await.map_err(read_error(path))?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_error(path))? {
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names.join("\n"))
}

fn read_error(path: &Path) -> impl Fn(std::io::Error) -> ProbeError + '_ {
    move |e| ProbeError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

async fn first_existing(paths: &[PathBuf]) -> Result<String, ProbeError> {
    for path in paths {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(path.display().to_string());
        }
    }
    Err(ProbeError::Empty {
        origin: paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}
