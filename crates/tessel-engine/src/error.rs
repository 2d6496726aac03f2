//! Errors from running a cluster of partitions.

use std::error::Error;
use std::fmt;
use std::io;

use tessel_core::PartitionId;

use crate::config::ConfigError;

/// Errors that stop a cluster run.
///
/// Exchange failures are not here: they are logged, counted in
/// [`StepMetrics`](crate::metrics::StepMetrics), and the step goes on.
#[derive(Debug)]
pub enum ClusterError {
    /// The configuration was rejected before any partition started.
    Config(ConfigError),
    /// A partition worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed and why.
        reason: String,
    },
    /// A partition worker thread panicked.
    WorkerPanicked {
        /// The partition whose worker died.
        partition: PartitionId,
    },
    /// A frame sink failed to consume a view.
    Sink {
        /// The partition whose view was being written.
        partition: PartitionId,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::WorkerPanicked { partition } => {
                write!(f, "worker for partition {partition} panicked")
            }
            Self::Sink { partition, source } => {
                write!(f, "frame sink failed for partition {partition}: {source}")
            }
        }
    }
}

impl Error for ClusterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Sink { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ClusterError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
