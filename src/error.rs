use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{call}: {source}")]
    System {
        call: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("port `{0}` is invalid")]
    InvalidPort(String),
    #[error("delay `{0}` is invalid (expected whole seconds)")]
    InvalidDelay(String),
    #[error("jobs `{0}` is invalid (expected a positive number)")]
    InvalidJobs(String),
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[source] rayon::ThreadPoolBuildError),
}

impl ScanError {
    /// Failure of a system call the scan can't recover from.
    pub fn system(call: &'static str, source: io::Error) -> Self {
        Self::System { call, source }
    }

    /// Status the process should exit with after this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanError::System { source, .. } => match source.raw_os_error() {
                Some(code) if code != 0 => code,
                _ => 1,
            },
            _ => 1,
        }
    }
}
