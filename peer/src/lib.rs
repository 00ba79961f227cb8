//! # Tangle Peer
//! The rollback-aware coordinator that lets every member of a room run the
//! same sandboxed deterministic module and converge on the same simulation
//! state, despite unsynchronized clocks and out-of-order delivery.
//!
//! The coordinator sits above two collaborators it does not implement: a
//! deterministic execution engine with snapshot/rollback (the
//! [`TimeMachine`](shared::TimeMachine) seam) and an ordered per-peer
//! datagram transport (the [`Room`](shared::Room) seam).

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use tangle_shared::{
        program_hash_hex, successor_of, ByteReader, ByteWriter, CodecError, CompressionConfig,
        CompressionMode, Message, MessageKind, PeerId, Room, RoomError, RoomEvent, RoomState,
        SimTime, TimeMachine, TimeMachineError, TimeStamp, WallClock,
    };
}

mod call_arg;
mod command;
mod config;
mod lifecycle;
mod peer_table;
mod tangle;

pub use call_arg::CallArg;
pub use config::TangleConfig;
pub use lifecycle::{StateChangeCallback, TangleState};
pub use peer_table::PeerRecord;
pub use tangle::Tangle;
