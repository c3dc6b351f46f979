//! Telemetry error types.

use sysfacts_protocol::FactKind;

/// Why a single source produced no text.
///
/// Carried inside [`RawProbeResult`](crate::probe::RawProbeResult) as data;
/// it never escapes a pipeline as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: String },

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("output of {origin} is not valid UTF-8")]
    Encoding { origin: String },

    #[error("{origin} produced no usable output")]
    Empty { origin: String },

    #[error("no source registered for {0}")]
    Unavailable(String),
}

/// Violations of the snapshot completion count.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CountdownError {
    #[error("{0} reported but was never planned")]
    Unplanned(FactKind),

    #[error("{0} reported more than once")]
    Duplicate(FactKind),
}
