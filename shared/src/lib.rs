//! # Tangle Shared
//! Common functionality shared between the tangle-peer coordinator and its
//! embedders: the wire protocol, peer identity, simulation-time types, and
//! the trait seams for the deterministic execution engine and the room
//! transport.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod backends;
mod connection;
mod constants;
mod hash;
mod messages;
mod peer_id;
mod room;
mod time;
mod time_machine;

pub use backends::WallClock;
pub use connection::{
    compression_config::{CompressionConfig, CompressionMode},
    decoder::Decoder,
    encoder::Encoder,
    error::{DecoderError, EncoderError},
};
pub use constants::{
    DIVERGENCE_LIMIT_MS, KEEP_ALIVE_INTERVAL_MS, MESSAGE_TIME_OFFSET_STEP, PRUNE_CUSHION_MS,
    STEP_BUDGET_RATIO,
};
pub use hash::program_hash_hex;
pub use messages::{
    error::CodecError, message::Message, message_kind::MessageKind, reader::ByteReader,
    writer::ByteWriter,
};
pub use peer_id::{successor_of, PeerId};
pub use room::{Room, RoomError, RoomEvent, RoomState};
pub use time::{SimTime, TimeStamp};
pub use time_machine::{TimeMachine, TimeMachineError};
