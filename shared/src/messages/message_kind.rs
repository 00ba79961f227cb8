// An enum representing the different kinds of datagrams peers exchange.
// Every datagram is one kind byte followed by that kind's payload.

use super::error::CodecError;

#[derive(Copy, Debug, Clone, Eq, PartialEq)]
pub enum MessageKind {
    // A module function invocation tagged with its logical time stamp
    WasmCall,
    // A bare simulation-time watermark; advances pruning, executes nothing
    TimeProgressed,
    // Ask a peer to broadcast its full encoded state
    RequestState,
    // A replacement module binary (reserved)
    SetProgram,
    // A full encoded state blob for bootstrapping
    SetHeap,
    // RTT probe carrying the sender's wall-clock milliseconds
    Ping,
    // Echo of a Ping with the original timestamp copied through
    Pong,
}

impl MessageKind {
    pub const fn to_u8(self) -> u8 {
        match self {
            MessageKind::WasmCall => 0,
            MessageKind::TimeProgressed => 1,
            MessageKind::RequestState => 2,
            MessageKind::SetProgram => 3,
            MessageKind::SetHeap => 4,
            MessageKind::Ping => 5,
            MessageKind::Pong => 6,
        }
    }

    pub fn from_u8(kind: u8) -> Result<Self, CodecError> {
        match kind {
            0 => Ok(MessageKind::WasmCall),
            1 => Ok(MessageKind::TimeProgressed),
            2 => Ok(MessageKind::RequestState),
            3 => Ok(MessageKind::SetProgram),
            4 => Ok(MessageKind::SetHeap),
            5 => Ok(MessageKind::Ping),
            6 => Ok(MessageKind::Pong),
            // Malformed or malicious packets get an error, never a panic.
            _ => Err(CodecError::UnknownKind { kind }),
        }
    }
}
