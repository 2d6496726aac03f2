//! Binary encode/decode for halo snapshots.
//!
//! All integers are little-endian and every float is written as its raw
//! IEEE-754 bits. No compression, no padding.

use std::io::{Read, Write};

use tessel_core::{IterationId, Particle, PartitionId};

use crate::error::HaloError;
use crate::snapshot::HaloSnapshot;
use crate::{FORMAT_VERSION, HEADER_BYTES, MAGIC, PARTICLE_RECORD_BYTES};

/// Upper bound on speculative preallocation when the total length is unknown.
const MAX_PREALLOC_RECORDS: usize = 4096;

// ── Primitive writers ───────────────────────────────────────────

fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), HaloError> {
    w.write_all(&[v])?;
    Ok(())
}

fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), HaloError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), HaloError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), HaloError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

fn read_u8(r: &mut dyn Read) -> Result<u8, HaloError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32_le(r: &mut dyn Read) -> Result<u32, HaloError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64_le(r: &mut dyn Read) -> Result<u64, HaloError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_f64_le(r: &mut dyn Read) -> Result<f64, HaloError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

// ── Particle records ────────────────────────────────────────────

/// Encode one particle as eight f64 values.
fn encode_particle(w: &mut dyn Write, p: &Particle) -> Result<(), HaloError> {
    for v in [p.mass, p.radius, p.x, p.y, p.vx, p.vy, p.fx, p.fy] {
        write_f64_le(w, v)?;
    }
    Ok(())
}

/// Decode one particle record.
fn decode_particle(r: &mut dyn Read) -> Result<Particle, HaloError> {
    Ok(Particle {
        mass: read_f64_le(r)?,
        radius: read_f64_le(r)?,
        x: read_f64_le(r)?,
        y: read_f64_le(r)?,
        vx: read_f64_le(r)?,
        vy: read_f64_le(r)?,
        fx: read_f64_le(r)?,
        fy: read_f64_le(r)?,
    })
}

fn encode_list(w: &mut dyn Write, particles: &[Particle], what: &str) -> Result<(), HaloError> {
    let count = u32::try_from(particles.len()).map_err(|_| HaloError::Malformed {
        detail: format!("{what} particle count {} exceeds u32", particles.len()),
    })?;
    write_u32_le(w, count)?;
    for p in particles {
        encode_particle(w, p)?;
    }
    Ok(())
}

fn decode_list(r: &mut dyn Read, count: usize, what: &str) -> Result<Vec<Particle>, HaloError> {
    let mut out = Vec::with_capacity(count.min(MAX_PREALLOC_RECORDS));
    for i in 0..count {
        let p = decode_particle(r).map_err(|e| match e {
            HaloError::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                HaloError::Malformed {
                    detail: format!("{what} list truncated at record {i} of {count}"),
                }
            }
            other => other,
        })?;
        out.push(p);
    }
    Ok(out)
}

// ── Snapshot encode/decode ──────────────────────────────────────

/// Encode a full snapshot.
pub fn encode_snapshot(w: &mut dyn Write, snap: &HaloSnapshot) -> Result<(), HaloError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_u32_le(w, snap.origin.0)?;
    write_u64_le(w, snap.iteration.0)?;
    encode_list(w, &snap.small, "small")?;
    encode_list(w, &snap.large, "large")?;
    Ok(())
}

/// Decode a full snapshot from a stream.
///
/// Reads exactly one snapshot and leaves any following bytes unread.
pub fn decode_snapshot(r: &mut dyn Read) -> Result<HaloSnapshot, HaloError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(HaloError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(HaloError::UnsupportedVersion { found: version });
    }

    let origin = PartitionId(read_u32_le(r)?);
    let iteration = IterationId(read_u64_le(r)?);
    let small_count = read_u32_le(r)? as usize;
    let small = decode_list(r, small_count, "small")?;
    let large_count = read_u32_le(r)? as usize;
    let large = decode_list(r, large_count, "large")?;

    Ok(HaloSnapshot {
        origin,
        iteration,
        small,
        large,
    })
}

/// Encode a snapshot into a freshly allocated buffer.
pub fn encode_to_vec(snap: &HaloSnapshot) -> Result<Vec<u8>, HaloError> {
    let mut buf = Vec::with_capacity(snap.encoded_len());
    encode_snapshot(&mut buf, snap)?;
    Ok(buf)
}

/// Decode a snapshot that must occupy the whole of `bytes`.
///
/// Declared counts are checked against the buffer length before any
/// allocation, so a corrupt count cannot trigger a huge reservation.
pub fn decode_from_slice(bytes: &[u8]) -> Result<HaloSnapshot, HaloError> {
    if bytes.len() < HEADER_BYTES {
        return Err(HaloError::Malformed {
            detail: format!(
                "buffer of {} bytes is shorter than the {HEADER_BYTES}-byte header",
                bytes.len()
            ),
        });
    }
    // small_count sits right after magic, version, origin and iteration.
    let small_at = 4 + 1 + 4 + 8;
    let mut count_bytes = [0u8; 4];
    count_bytes.copy_from_slice(&bytes[small_at..small_at + 4]);
    let small_count = u32::from_le_bytes(count_bytes) as usize;
    let available = (bytes.len() - HEADER_BYTES) / PARTICLE_RECORD_BYTES;
    if small_count > available {
        return Err(HaloError::Malformed {
            detail: format!("small count {small_count} exceeds the {available} records present"),
        });
    }

    let mut cursor = bytes;
    let snap = decode_snapshot(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(HaloError::TrailingBytes {
            count: cursor.len(),
        });
    }
    Ok(snap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> HaloSnapshot {
        let mut a = Particle::at_rest(1.0, 0.5, 3.25, 4.5);
        a.vx = -0.125;
        a.fy = 7.0;
        let b = Particle::at_rest(40.0, 3.0, 12.0, 1.0);
        HaloSnapshot {
            origin: PartitionId(3),
            iteration: IterationId(17),
            small: vec![a, a],
            large: vec![b],
        }
    }

    #[test]
    fn round_trip_is_exact() {
        let snap = sample();
        let bytes = encode_to_vec(&snap).unwrap();
        assert_eq!(bytes.len(), snap.encoded_len());
        assert_eq!(decode_from_slice(&bytes).unwrap(), snap);
    }

    #[test]
    fn empty_snapshot_is_header_only() {
        let snap = HaloSnapshot::default();
        let bytes = encode_to_vec(&snap).unwrap();
        assert_eq!(bytes.len(), HEADER_BYTES);
        assert_eq!(&bytes[..4], b"HALO");
        assert_eq!(bytes[4], FORMAT_VERSION);
        assert_eq!(decode_from_slice(&bytes).unwrap(), snap);
    }

    #[test]
    fn layout_is_little_endian() {
        let snap = HaloSnapshot {
            origin: PartitionId(0x0102_0304),
            iteration: IterationId(5),
            small: vec![],
            large: vec![Particle::at_rest(2.0, 0.0, 0.0, 0.0)],
        };
        let bytes = encode_to_vec(&snap).unwrap();
        assert_eq!(&bytes[5..9], &[4, 3, 2, 1]);
        assert_eq!(&bytes[9..17], &5u64.to_le_bytes());
        assert_eq!(&bytes[17..21], &0u32.to_le_bytes());
        assert_eq!(&bytes[21..25], &1u32.to_le_bytes());
        assert_eq!(&bytes[25..33], &2.0f64.to_le_bytes());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = encode_to_vec(&sample()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode_from_slice(&bytes), Err(HaloError::InvalidMagic)));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut bytes = encode_to_vec(&sample()).unwrap();
        bytes[4] = 99;
        assert!(matches!(
            decode_from_slice(&bytes),
            Err(HaloError::UnsupportedVersion { found: 99 })
        ));
    }

    #[test]
    fn truncated_record_is_malformed() {
        let bytes = encode_to_vec(&sample()).unwrap();
        let cut = &bytes[..bytes.len() - 3];
        assert!(matches!(
            decode_from_slice(cut),
            Err(HaloError::Malformed { .. })
        ));
    }

    #[test]
    fn short_header_is_malformed() {
        assert!(matches!(
            decode_from_slice(b"HAL"),
            Err(HaloError::Malformed { .. })
        ));
    }

    #[test]
    fn huge_declared_count_fails_without_allocating() {
        let mut bytes = encode_to_vec(&HaloSnapshot::default()).unwrap();
        bytes[17..21].copy_from_slice(&u32::MAX.to_le_bytes());
        let err = decode_from_slice(&bytes).unwrap_err();
        assert!(err.to_string().contains("small count"));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode_to_vec(&sample()).unwrap();
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(
            decode_from_slice(&bytes),
            Err(HaloError::TrailingBytes { count: 2 })
        ));
    }

    #[test]
    fn stream_decode_leaves_following_bytes() {
        let mut bytes = encode_to_vec(&sample()).unwrap();
        let first_len = bytes.len();
        bytes.extend(encode_to_vec(&HaloSnapshot::default()).unwrap());
        let mut cursor = &bytes[..];
        let first = decode_snapshot(&mut cursor).unwrap();
        assert_eq!(first, sample());
        assert_eq!(cursor.len(), bytes.len() - first_len);
        let second = decode_snapshot(&mut cursor).unwrap();
        assert_eq!(second.particle_count(), 0);
        assert!(cursor.is_empty());
    }

    fn arb_particle() -> impl Strategy<Value = Particle> {
        proptest::collection::vec(any::<u64>(), 8).prop_map(|bits| Particle {
            mass: f64::from_bits(bits[0]),
            radius: f64::from_bits(bits[1]),
            x: f64::from_bits(bits[2]),
            y: f64::from_bits(bits[3]),
            vx: f64::from_bits(bits[4]),
            vy: f64::from_bits(bits[5]),
            fx: f64::from_bits(bits[6]),
            fy: f64::from_bits(bits[7]),
        })
    }

    proptest! {
        #[test]
        fn arbitrary_bits_survive_encoding(
            origin in any::<u32>(),
            iteration in any::<u64>(),
            small in proptest::collection::vec(arb_particle(), 0..8),
            large in proptest::collection::vec(arb_particle(), 0..4),
        ) {
            let snap = HaloSnapshot {
                origin: PartitionId(origin),
                iteration: IterationId(iteration),
                small,
                large,
            };
            let back = decode_from_slice(&encode_to_vec(&snap).unwrap()).unwrap();
            prop_assert_eq!(back.origin, snap.origin);
            prop_assert_eq!(back.iteration, snap.iteration);
            prop_assert_eq!(back.small.len(), snap.small.len());
            prop_assert_eq!(back.large.len(), snap.large.len());
            for (a, b) in back.particles().zip(snap.particles()) {
                prop_assert_eq!(a.bit_pattern(), b.bit_pattern());
            }
        }

        #[test]
        fn any_truncation_is_an_error(cut in 0usize..200) {
            let bytes = encode_to_vec(&sample()).unwrap();
            let cut = cut.min(bytes.len() - 1);
            prop_assert!(decode_from_slice(&bytes[..cut]).is_err());
        }
    }
}
