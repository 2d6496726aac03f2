//! Point-to-point message transports for the halo exchange.
//!
//! The synchronization driver only needs two blocking primitives: send
//! one buffer to a named peer, and receive one buffer from any peer.
//! [`Transport`] captures exactly that. Two implementations exist:
//!
//! - [`ChannelTransport`]: one zero-capacity crossbeam channel per
//!   partition. A send completes only when the receiver takes the
//!   message, so every exchange is a rendezvous between two threads.
//! - [`MailboxTransport`]: a view into an in-memory [`Mailbox`] used by
//!   the single-threaded lockstep cluster. Sends enqueue; a receive on
//!   an empty queue fails instead of blocking.

use std::collections::VecDeque;
use std::fmt;

use crossbeam_channel::{bounded, Receiver, Sender};
use tessel_core::PartitionId;

/// An encoded payload tagged with its sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// The sending partition.
    pub from: PartitionId,
    /// The encoded halo snapshot.
    pub payload: Vec<u8>,
}

/// Errors from a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The destination is not reachable through this transport.
    UnknownPeer {
        /// The requested destination.
        to: PartitionId,
    },
    /// The other end of the channel has gone away.
    Disconnected {
        /// The partition whose channel closed.
        peer: PartitionId,
    },
    /// A non-blocking receive found nothing queued.
    Empty {
        /// The partition whose queue was empty.
        partition: PartitionId,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPeer { to } => write!(f, "no route to partition {to}"),
            Self::Disconnected { peer } => write!(f, "channel to partition {peer} disconnected"),
            Self::Empty { partition } => write!(f, "no message queued for partition {partition}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Blocking point-to-point messaging between partitions.
pub trait Transport {
    /// The partition this endpoint belongs to.
    fn local_id(&self) -> PartitionId;

    /// Deliver `payload` to `to`.
    fn send(&mut self, to: PartitionId, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Take the next message addressed to this partition, from any sender.
    fn recv_any(&mut self) -> Result<Envelope, TransportError>;
}

// ── ChannelTransport ───────────────────────────────────────────────

/// A partition's endpoint in a fully connected rendezvous mesh.
pub struct ChannelTransport {
    id: PartitionId,
    inbox: Receiver<Envelope>,
    /// Indexed by destination id; `None` at the local id.
    peers: Vec<Option<Sender<Envelope>>>,
}

impl ChannelTransport {
    /// Build one endpoint per partition, each able to reach every other.
    ///
    /// An endpoint holds no sender to itself, so its inbox disconnects
    /// once every other endpoint has been dropped.
    pub fn mesh(partition_count: u32) -> Vec<ChannelTransport> {
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..partition_count).map(|_| bounded::<Envelope>(0)).unzip();

        receivers
            .into_iter()
            .enumerate()
            .map(|(i, inbox)| {
                let peers = senders
                    .iter()
                    .enumerate()
                    .map(|(j, tx)| (i != j).then(|| tx.clone()))
                    .collect();
                ChannelTransport {
                    id: PartitionId(i as u32),
                    inbox,
                    peers,
                }
            })
            .collect()
    }
}

impl Transport for ChannelTransport {
    fn local_id(&self) -> PartitionId {
        self.id
    }

    fn send(&mut self, to: PartitionId, payload: Vec<u8>) -> Result<(), TransportError> {
        let tx = self
            .peers
            .get(to.index())
            .and_then(Option::as_ref)
            .ok_or(TransportError::UnknownPeer { to })?;
        tx.send(Envelope {
            from: self.id,
            payload,
        })
        .map_err(|_| TransportError::Disconnected { peer: to })
    }

    fn recv_any(&mut self) -> Result<Envelope, TransportError> {
        self.inbox
            .recv()
            .map_err(|_| TransportError::Disconnected { peer: self.id })
    }
}

// ── Mailbox ────────────────────────────────────────────────────────

/// Per-partition FIFO queues for single-threaded exchange.
#[derive(Debug, Default)]
pub struct Mailbox {
    queues: Vec<VecDeque<Envelope>>,
}

impl Mailbox {
    /// One empty queue per partition.
    pub fn new(partition_count: u32) -> Self {
        Self {
            queues: (0..partition_count).map(|_| VecDeque::new()).collect(),
        }
    }

    /// Borrow the endpoint of partition `id`.
    pub fn endpoint(&mut self, id: PartitionId) -> MailboxTransport<'_> {
        MailboxTransport { id, mailbox: self }
    }

    /// Whether every queue is empty.
    pub fn is_drained(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }
}

/// A [`Transport`] backed by a borrowed [`Mailbox`].
pub struct MailboxTransport<'a> {
    id: PartitionId,
    mailbox: &'a mut Mailbox,
}

impl Transport for MailboxTransport<'_> {
    fn local_id(&self) -> PartitionId {
        self.id
    }

    fn send(&mut self, to: PartitionId, payload: Vec<u8>) -> Result<(), TransportError> {
        if to == self.id {
            return Err(TransportError::UnknownPeer { to });
        }
        let queue = self
            .mailbox
            .queues
            .get_mut(to.index())
            .ok_or(TransportError::UnknownPeer { to })?;
        queue.push_back(Envelope {
            from: self.id,
            payload,
        });
        Ok(())
    }

    fn recv_any(&mut self) -> Result<Envelope, TransportError> {
        self.mailbox
            .queues
            .get_mut(self.id.index())
            .and_then(VecDeque::pop_front)
            .ok_or(TransportError::Empty { partition: self.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn mailbox_delivers_in_fifo_order() {
        let mut mb = Mailbox::new(3);
        mb.endpoint(PartitionId(0)).send(PartitionId(2), vec![1]).unwrap();
        mb.endpoint(PartitionId(1)).send(PartitionId(2), vec![2]).unwrap();
        assert!(!mb.is_drained());

        let mut rx = mb.endpoint(PartitionId(2));
        assert_eq!(rx.recv_any().unwrap().from, PartitionId(0));
        assert_eq!(rx.recv_any().unwrap().payload, vec![2]);
        assert_eq!(
            rx.recv_any(),
            Err(TransportError::Empty {
                partition: PartitionId(2)
            })
        );
        assert!(mb.is_drained());
    }

    #[test]
    fn mailbox_rejects_unknown_and_self() {
        let mut mb = Mailbox::new(2);
        let mut ep = mb.endpoint(PartitionId(0));
        assert_eq!(
            ep.send(PartitionId(5), vec![]),
            Err(TransportError::UnknownPeer { to: PartitionId(5) })
        );
        assert!(ep.send(PartitionId(0), vec![]).is_err());
    }

    #[test]
    fn channel_mesh_is_rendezvous() {
        let mut mesh = ChannelTransport::mesh(2);
        let mut b = mesh.pop().unwrap();
        let mut a = mesh.pop().unwrap();
        assert_eq!(a.local_id(), PartitionId(0));
        assert_eq!(b.local_id(), PartitionId(1));

        let sender = thread::spawn(move || {
            a.send(PartitionId(1), vec![7, 8]).unwrap();
            a
        });
        let env = b.recv_any().unwrap();
        assert_eq!(env.from, PartitionId(0));
        assert_eq!(env.payload, vec![7, 8]);
        sender.join().unwrap();
    }

    #[test]
    fn channel_has_no_route_to_self() {
        let mut mesh = ChannelTransport::mesh(2);
        assert_eq!(
            mesh[0].send(PartitionId(0), vec![]),
            Err(TransportError::UnknownPeer { to: PartitionId(0) })
        );
        assert!(mesh[0].send(PartitionId(9), vec![]).is_err());
    }

    #[test]
    fn channel_reports_disconnect() {
        let mut mesh = ChannelTransport::mesh(2);
        let b = mesh.pop().unwrap();
        let mut a = mesh.pop().unwrap();
        drop(b);
        assert_eq!(
            a.send(PartitionId(1), vec![]),
            Err(TransportError::Disconnected { peer: PartitionId(1) })
        );
        assert!(a.recv_any().is_err());
    }
}
