use std::collections::HashMap;

use tangle_shared::{PeerId, SimTime, KEEP_ALIVE_INTERVAL_MS};

/// Liveness and watermark bookkeeping for one remote peer.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerRecord {
    /// Highest simulation time this peer is known to have heard from us
    pub last_sent_message: SimTime,
    /// Highest simulation time received from this peer. Starts at +inf so
    /// a newcomer that has sent nothing yet never holds pruning back.
    pub last_received_message: SimTime,
    /// Measured round trip, wall-clock milliseconds
    pub round_trip_time: f64,
}

impl PeerRecord {
    pub fn new() -> Self {
        Self {
            last_sent_message: 0.0,
            last_received_message: f64::INFINITY,
            round_trip_time: 0.0,
        }
    }
}

impl Default for PeerRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// The coordinator's view of room membership. Mutated only inside the
/// command lane.
pub(crate) struct PeerTable {
    peers: HashMap<PeerId, PeerRecord>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
        }
    }

    pub fn insert(&mut self, peer: PeerId) {
        self.peers.insert(peer, PeerRecord::new());
    }

    pub fn remove(&mut self, peer: PeerId) -> Option<PeerRecord> {
        self.peers.remove(&peer)
    }

    pub fn contains(&self, peer: PeerId) -> bool {
        self.peers.contains_key(&peer)
    }

    pub fn get(&self, peer: PeerId) -> Option<&PeerRecord> {
        self.peers.get(&peer)
    }

    pub fn get_mut(&mut self, peer: PeerId) -> Option<&mut PeerRecord> {
        self.peers.get_mut(&peer)
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.peers.keys().copied()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&PeerId, &mut PeerRecord)> {
        self.peers.iter_mut()
    }

    /// Fold the received-watermark floor under `limit`: the earliest
    /// simulation time any peer could still roll us back into.
    pub fn earliest_received(&self, limit: SimTime) -> SimTime {
        self.peers
            .values()
            .fold(limit, |floor, record| floor.min(record.last_received_message))
    }

    /// Peers that have heard nothing from us for longer than the
    /// keep-alive interval, as of `target_time`.
    pub fn keep_alive_due(&self, target_time: SimTime) -> Vec<PeerId> {
        self.peers
            .iter()
            .filter(|(_, record)| {
                target_time - record.last_sent_message > KEEP_ALIVE_INTERVAL_MS
            })
            .map(|(peer, _)| *peer)
            .collect()
    }
}
