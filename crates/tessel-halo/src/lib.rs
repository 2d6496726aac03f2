//! Halo snapshots and their binary wire format.
//!
//! At the end of every step a partition captures a [`HaloSnapshot`] of
//! its particles and sends it, encoded, to each of its neighbours. The
//! receivers decode it during the next step to extend their force
//! computation and to admit particles that migrated into their box.
//!
//! # Format
//!
//! ```text
//! [MAGIC "HALO"] [VERSION u8] [origin u32] [iteration u64]
//! [small_count u32] [small records...]
//! [large_count u32] [large records...]
//! ```
//!
//! All integers and floats are little-endian. Each particle record is
//! eight `f64` values: mass, radius, x, y, vx, vy, fx, fy. Floats are
//! copied bit-for-bit, so decoding an encoded snapshot reproduces it
//! exactly, NaN payloads included.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod snapshot;

pub use codec::{decode_from_slice, decode_snapshot, encode_snapshot, encode_to_vec};
pub use error::HaloError;
pub use snapshot::HaloSnapshot;

/// Magic bytes at the start of every encoded snapshot.
pub const MAGIC: [u8; 4] = *b"HALO";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

/// Encoded size of one particle record in bytes.
pub const PARTICLE_RECORD_BYTES: usize = 8 * 8;

/// Encoded size of the fixed header and both count fields.
pub const HEADER_BYTES: usize = 4 + 1 + 4 + 8 + 4 + 4;
