//! Partition grid geometry for Tessel.
//!
//! The simulated domain is a torus cut into a `side × side` grid of
//! square cells, one per partition. This crate maps partition ids to
//! grid coordinates and bounding boxes, finds the owner of a point, and
//! resolves which partitions exchange halo data with each other.
//!
//! # Topology
//!
//! [`neighbors`] returns every partition within a Chebyshev horizon on
//! the toroidal grid. It is pure and is evaluated once per partition at
//! startup; the resulting [`NeighborSet`] is symmetric, which is what
//! lets the round-robin halo exchange pair every send with a receive.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod topology;

pub use error::TopologyError;
pub use grid::{grid_side, PartitionGrid};
pub use topology::{neighbors, NeighborSet};
