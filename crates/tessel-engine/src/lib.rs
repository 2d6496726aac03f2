//! Simulation engine for partitioned Tessel runs.
//!
//! Each [`Partition`] owns one square cell of the toroidal domain and
//! the particles inside it. Once per step every partition exchanges
//! encoded halo snapshots with its neighbours in a fixed round-robin
//! order, then computes forces, integrates, admits migrants, publishes
//! its next snapshot and evicts particles that left its cell.
//!
//! Two runners drive the same protocol:
//!
//! - [`LockstepCluster`]: every partition on the calling thread, over an
//!   in-memory mailbox. Deterministic and easy to inspect between steps.
//! - [`ThreadedCluster`]: one OS thread per partition, over zero-capacity
//!   crossbeam channels.
//!
//! Both produce bit-identical particle state for the same configuration.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod lockstep;
pub mod metrics;
pub mod partition;
pub mod sync;
pub mod threaded;
pub mod transport;
pub mod view;

pub use config::{ClusterConfig, ConfigError, SimConfig};
pub use error::ClusterError;
pub use lockstep::LockstepCluster;
pub use metrics::{RunReport, StepMetrics};
pub use partition::{Partition, StepPhase};
pub use sync::{exchange_all, exchange_turn, SyncStats};
pub use threaded::{FinishedRun, ThreadedCluster};
pub use transport::{ChannelTransport, Envelope, Mailbox, MailboxTransport, Transport, TransportError};
pub use view::{FrameSink, FrameStage, NullSink, PartitionView};
