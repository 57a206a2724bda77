use std::io;

/// Failure of a pipe-reading session.
///
/// Every variant is fatal for the session that produced it. Before the error
/// is returned the shared [`Control`](crate::control::state::Control) has been
/// moved to `Aborted` and the decoder process has been terminated and reaped.
#[derive(thiserror::Error, Debug)]
pub enum PipeError {
    #[error("Could not set up the decoder process: {0}")]
    ProcessSetup(#[source] io::Error),

    #[error("Could not execute decoder `{program}`: {source}")]
    ProcessExec {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Read from decoder pipe failed: {0}")]
    Read(#[source] io::Error),

    #[error("Could not {action} decoder process: {source}")]
    ProcessControl {
        action: ProcessAction,
        #[source]
        source: io::Error,
    },
}

impl PipeError {
    /// True when the decoder was never running, i.e. launching it failed.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, PipeError::ProcessSetup(_) | PipeError::ProcessExec { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessAction {
    Suspend,
    Resume,
    Terminate,
    Reap,
}

impl std::fmt::Display for ProcessAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessAction::Suspend => write!(f, "suspend"),
            ProcessAction::Resume => write!(f, "resume"),
            ProcessAction::Terminate => write!(f, "terminate"),
            ProcessAction::Reap => write!(f, "reap"),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum IntervalError {
    #[error("Interval thresholds must be greater than zero")]
    ZeroThreshold,

    #[error("Interval thresholds must be strictly ascending: {previous} is followed by {next}")]
    NotAscending { previous: usize, next: usize },

    #[error("Interval threshold {threshold} exceeds buffer capacity {capacity}")]
    ExceedsCapacity { threshold: usize, capacity: usize },

    #[error("Invalid interval length in seconds: {0}")]
    InvalidSeconds(f64),
}
