//! Adapters around the Tessel engine: PPM previews and the file sink the
//! `tessel` binary hands to a cluster run.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod ppm;
pub mod sink;

pub use ppm::{render, Raster};
pub use sink::PpmSink;
