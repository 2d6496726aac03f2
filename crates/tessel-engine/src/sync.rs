//! The round-robin halo exchange.
//!
//! Every partition walks the same turn sequence `0..partition_count`.
//! On turn `j`, partition `j` receives one message from each of its
//! neighbours and every neighbour of `j` sends it one message; all other
//! partitions do nothing. Because the neighbour relation is symmetric,
//! the number of sends addressed to `j` on turn `j` equals the number of
//! receives `j` performs, so blocking rendezvous channels never deadlock.
//!
//! Failures never abort a step. A failed send or an undecodable or stale
//! message is logged and counted, and the step continues with whatever
//! arrived.

use std::time::Instant;

use tessel_core::PartitionId;
use tessel_halo::decode_from_slice;
use tracing::{trace, warn};

use crate::metrics::StepMetrics;
use crate::partition::Partition;
use crate::transport::Transport;

/// Traffic counters for one partition's exchange in one step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Time spent inside exchange turns, in microseconds.
    pub elapsed_us: u64,
    /// Snapshots accepted into the halo buffer.
    pub halos_received: usize,
    /// Encoded bytes received.
    pub bytes_in: usize,
    /// Encoded bytes sent.
    pub bytes_out: usize,
    /// Receives that failed, or whose payload was rejected.
    pub failed_receives: usize,
    /// Sends that failed.
    pub failed_sends: usize,
}

impl SyncStats {
    /// Copy the counters into a step's metrics.
    pub fn apply_to(&self, m: &mut StepMetrics) {
        m.sync_us = self.elapsed_us;
        m.halos_received = self.halos_received;
        m.bytes_in = self.bytes_in;
        m.bytes_out = self.bytes_out;
        m.failed_receives = self.failed_receives;
        m.failed_sends = self.failed_sends;
    }
}

/// Play `partition`'s part in exchange turn `turn`.
pub fn exchange_turn(
    partition: &mut Partition,
    turn: PartitionId,
    transport: &mut dyn Transport,
    stats: &mut SyncStats,
) {
    let start = Instant::now();
    if turn == partition.id() {
        receive_all(partition, transport, stats);
    } else if partition.neighbors().contains(turn) {
        let payload = partition.outgoing().to_vec();
        let len = payload.len();
        match transport.send(turn, payload) {
            Ok(()) => {
                trace!(from = %partition.id(), to = %turn, bytes = len, "halo sent");
                stats.bytes_out += len;
            }
            Err(e) => {
                warn!(from = %partition.id(), to = %turn, error = %e, "halo send failed");
                stats.failed_sends += 1;
            }
        }
    }
    stats.elapsed_us += start.elapsed().as_micros() as u64;
}

fn receive_all(partition: &mut Partition, transport: &mut dyn Transport, stats: &mut SyncStats) {
    let id = partition.id();
    let expected = partition.iteration();
    for _ in 0..partition.neighbors().len() {
        let envelope = match transport.recv_any() {
            Ok(env) => env,
            Err(e) => {
                warn!(partition = %id, error = %e, "halo receive failed");
                stats.failed_receives += 1;
                // Nothing more will arrive on a dead or empty transport.
                break;
            }
        };
        stats.bytes_in += envelope.payload.len();
        match decode_from_slice(&envelope.payload) {
            Ok(snap) if snap.iteration != expected => {
                warn!(
                    partition = %id,
                    from = %envelope.from,
                    expected = %expected,
                    found = %snap.iteration,
                    "dropping halo from another iteration"
                );
                stats.failed_receives += 1;
            }
            Ok(snap) if snap.origin != envelope.from => {
                warn!(
                    partition = %id,
                    from = %envelope.from,
                    origin = %snap.origin,
                    "dropping halo whose origin does not match its sender"
                );
                stats.failed_receives += 1;
            }
            Ok(snap) => {
                trace!(
                    partition = %id,
                    from = %envelope.from,
                    particles = snap.particle_count(),
                    "halo received"
                );
                stats.halos_received += 1;
                partition.receive_halo(snap);
            }
            Err(e) => {
                warn!(partition = %id, from = %envelope.from, error = %e, "undecodable halo");
                stats.failed_receives += 1;
            }
        }
    }
}

/// Run every turn of one step's exchange for a single partition.
///
/// Used by threaded workers, where every partition runs this loop
/// concurrently against a rendezvous transport.
pub fn exchange_all(
    partition: &mut Partition,
    partition_count: u32,
    transport: &mut dyn Transport,
) -> SyncStats {
    let mut stats = SyncStats::default();
    for turn in 0..partition_count {
        exchange_turn(partition, PartitionId(turn), transport, &mut stats);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::transport::{Envelope, Mailbox, TransportError};
    use tessel_core::{IntegrationScheme, IterationId, Particle};
    use tessel_halo::{encode_to_vec, HaloSnapshot};
    use tessel_space::PartitionGrid;

    fn config() -> SimConfig {
        SimConfig {
            time_slots: 4,
            time_step: 0.1,
            horizon: 1,
            grid_size: 10,
            small_particle_count: 0,
            small_particle_mass: 1.0,
            small_particle_radius: 0.1,
            large_particles: Vec::new(),
            seed: 0,
            integration: IntegrationScheme::Kinematic,
        }
    }

    fn partitions() -> Vec<Partition> {
        let cfg = config();
        let grid = PartitionGrid::new(4, 10.0).unwrap();
        grid.ids()
            .map(|id| {
                let b = grid.bounds_of(id).unwrap();
                let p = Particle::at_rest(1.0, 0.1, b.min_x + 5.0, b.min_y + 5.0);
                Partition::with_particles(&cfg, &grid, id, vec![p], vec![]).unwrap()
            })
            .collect()
    }

    #[test]
    fn mailbox_exchange_delivers_every_neighbour() {
        let mut parts = partitions();
        let mut mailbox = Mailbox::new(4);
        let mut stats = vec![SyncStats::default(); 4];
        for p in parts.iter_mut() {
            assert!(p.begin_step());
        }
        for j in 0..4u32 {
            let turn = PartitionId(j);
            for (k, p) in parts.iter_mut().enumerate() {
                if k as u32 != j {
                    let id = p.id();
                    exchange_turn(p, turn, &mut mailbox.endpoint(id), &mut stats[k]);
                }
            }
            let p = &mut parts[j as usize];
            exchange_turn(p, turn, &mut mailbox.endpoint(turn), &mut stats[j as usize]);
        }
        assert!(mailbox.is_drained());
        for (p, s) in parts.iter().zip(&stats) {
            assert_eq!(p.halo().len(), 3);
            assert_eq!(s.halos_received, 3);
            assert_eq!(s.failed_receives, 0);
            assert_eq!(s.bytes_out, 3 * p.outgoing().len());
        }
    }

    /// A transport that hands out a fixed list of envelopes.
    struct Scripted {
        id: PartitionId,
        inbox: Vec<Envelope>,
        sent: Vec<(PartitionId, usize)>,
    }

    impl Transport for Scripted {
        fn local_id(&self) -> PartitionId {
            self.id
        }

        fn send(&mut self, to: PartitionId, payload: Vec<u8>) -> Result<(), TransportError> {
            self.sent.push((to, payload.len()));
            Ok(())
        }

        fn recv_any(&mut self) -> Result<Envelope, TransportError> {
            if self.inbox.is_empty() {
                return Err(TransportError::Empty { partition: self.id });
            }
            Ok(self.inbox.remove(0))
        }
    }

    fn envelope(from: u32, origin: u32, iteration: u64) -> Envelope {
        let snap = HaloSnapshot {
            origin: PartitionId(origin),
            iteration: IterationId(iteration),
            small: vec![Particle::at_rest(1.0, 0.1, 15.0, 5.0)],
            large: vec![],
        };
        Envelope {
            from: PartitionId(from),
            payload: encode_to_vec(&snap).unwrap(),
        }
    }

    #[test]
    fn stale_garbled_and_forged_halos_are_dropped() {
        let mut parts = partitions();
        let p = &mut parts[0];
        assert!(p.begin_step());
        let mut t = Scripted {
            id: PartitionId(0),
            inbox: vec![
                envelope(1, 1, 7),
                Envelope {
                    from: PartitionId(2),
                    payload: vec![1, 2, 3],
                },
                envelope(3, 2, 0),
            ],
            sent: vec![],
        };
        let mut stats = SyncStats::default();
        exchange_turn(p, PartitionId(0), &mut t, &mut stats);
        assert_eq!(stats.failed_receives, 3);
        assert_eq!(stats.halos_received, 0);
        assert!(p.halo().is_empty());
    }

    #[test]
    fn short_delivery_stops_at_first_failure() {
        let mut parts = partitions();
        let p = &mut parts[0];
        assert!(p.begin_step());
        let mut t = Scripted {
            id: PartitionId(0),
            inbox: vec![envelope(1, 1, 0)],
            sent: vec![],
        };
        let mut stats = SyncStats::default();
        exchange_turn(p, PartitionId(0), &mut t, &mut stats);
        assert_eq!(stats.halos_received, 1);
        assert_eq!(stats.failed_receives, 1);
        assert_eq!(p.halo().len(), 1);
    }

    #[test]
    fn non_neighbour_turns_are_silent() {
        let cfg = SimConfig {
            horizon: 0,
            ..config()
        };
        let grid = PartitionGrid::new(4, 10.0).unwrap();
        let mut p = Partition::with_particles(&cfg, &grid, PartitionId(0), vec![], vec![]).unwrap();
        let mut t = Scripted {
            id: PartitionId(0),
            inbox: vec![],
            sent: vec![],
        };
        let stats = exchange_all(&mut p, 4, &mut t);
        assert!(t.sent.is_empty());
        assert_eq!(stats.failed_receives, 0);
        assert_eq!(stats.bytes_out, 0);
    }

    #[test]
    fn exchange_all_sends_once_per_neighbour() {
        let mut parts = partitions();
        let p = &mut parts[0];
        let mut t = Scripted {
            id: PartitionId(0),
            inbox: vec![envelope(1, 1, 0), envelope(2, 2, 0), envelope(3, 3, 0)],
            sent: vec![],
        };
        let stats = exchange_all(p, 4, &mut t);
        let dests: Vec<PartitionId> = t.sent.iter().map(|(to, _)| *to).collect();
        assert_eq!(dests, vec![PartitionId(1), PartitionId(2), PartitionId(3)]);
        assert_eq!(stats.halos_received, 3);
    }
}
