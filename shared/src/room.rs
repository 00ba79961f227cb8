use thiserror::Error;

use crate::peer_id::PeerId;

/// Connection state of the underlying room transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Connected,
    Joining,
    Disconnected,
}

/// An event delivered by the room transport, in delivery order.
///
/// Per-peer ordering is a transport guarantee the coordinator leans on:
/// datagrams from one peer arrive in the order they were sent, and a
/// peer's join is delivered before any of its datagrams (the coordinator
/// still tolerates the reverse by deferring early datagrams).
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    PeerJoined(PeerId),
    PeerLeft(PeerId),
    StateChanged(RoomState),
    Message { from: PeerId, payload: Vec<u8> },
}

/// Errors surfaced by a room transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// The datagram could not be handed to the transport
    #[error("failed to send datagram to {target}")]
    SendFailed { target: String },
}

/// A peer-to-peer transport providing ordered, reliable per-peer
/// datagrams within a named room.
///
/// Signaling, NAT traversal, and delivery guarantees live behind this
/// seam; the coordinator only sends bytes and polls events.
pub trait Room {
    /// This peer's id within the room.
    fn my_id(&self) -> PeerId;

    /// Send a datagram to one peer, or to every other member when `to`
    /// is None. The payload must be copied if delivery is deferred.
    fn send(&mut self, to: Option<PeerId>, payload: &[u8]) -> Result<(), RoomError>;

    /// The connected peer with the lowest measured latency, if any.
    fn lowest_latency_peer(&self) -> Option<PeerId>;

    /// Poll the next pending event, in delivery order.
    fn receive(&mut self) -> Option<RoomEvent>;

    /// Leave the room. Further sends fail; no events follow.
    fn disconnect(&mut self);
}
