use crate::time::SimTime;

use super::error::CodecError;
use super::message_kind::MessageKind;
use super::reader::ByteReader;
use super::writer::ByteWriter;

/// A decoded wire datagram. Blob payloads borrow from the received bytes;
/// everything else is copied out into fixed-width fields.
///
/// All numbers travel as little-endian; call arguments always travel as
/// f64, and any widening or narrowing on the receiving side is the
/// module's concern.
#[derive(Debug, Clone, PartialEq)]
pub enum Message<'a> {
    WasmCall {
        function_index: u32,
        time: SimTime,
        args: Vec<f64>,
    },
    TimeProgressed {
        time: SimTime,
    },
    RequestState,
    SetProgram {
        binary: &'a [u8],
    },
    SetHeap {
        heap: &'a [u8],
    },
    Ping {
        wall_clock_ms: f64,
    },
    Pong {
        wall_clock_ms: f64,
    },
}

impl<'a> Message<'a> {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::WasmCall { .. } => MessageKind::WasmCall,
            Message::TimeProgressed { .. } => MessageKind::TimeProgressed,
            Message::RequestState => MessageKind::RequestState,
            Message::SetProgram { .. } => MessageKind::SetProgram,
            Message::SetHeap { .. } => MessageKind::SetHeap,
            Message::Ping { .. } => MessageKind::Ping,
            Message::Pong { .. } => MessageKind::Pong,
        }
    }

    /// Frame this message into `writer` (kind byte first).
    pub fn write(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_u8(self.kind().to_u8());
        match self {
            Message::WasmCall {
                function_index,
                time,
                args,
            } => {
                if args.len() > u8::MAX as usize {
                    return Err(CodecError::TooManyArguments { count: args.len() });
                }
                writer.write_u32(*function_index);
                writer.write_f64(*time);
                writer.write_u8(args.len() as u8);
                for arg in args {
                    writer.write_f64(*arg);
                }
            }
            Message::TimeProgressed { time } => writer.write_f64(*time),
            Message::RequestState => {}
            Message::SetProgram { binary } => writer.write_bytes(binary),
            Message::SetHeap { heap } => writer.write_bytes(heap),
            Message::Ping { wall_clock_ms } | Message::Pong { wall_clock_ms } => {
                writer.write_f64(*wall_clock_ms)
            }
        }
        Ok(())
    }

    /// Parse a full datagram (kind byte included).
    pub fn read(payload: &'a [u8]) -> Result<Self, CodecError> {
        if payload.is_empty() {
            return Err(CodecError::EmptyPayload);
        }
        let mut reader = ByteReader::new(payload);
        let kind = MessageKind::from_u8(reader.read_u8()?)?;
        match kind {
            MessageKind::WasmCall => {
                let function_index = reader.read_u32()?;
                let time = reader.read_f64()?;
                let arg_count = reader.read_u8()? as usize;
                let mut args = Vec::with_capacity(arg_count);
                for _ in 0..arg_count {
                    args.push(reader.read_f64()?);
                }
                Ok(Message::WasmCall {
                    function_index,
                    time,
                    args,
                })
            }
            MessageKind::TimeProgressed => Ok(Message::TimeProgressed {
                time: reader.read_f64()?,
            }),
            MessageKind::RequestState => Ok(Message::RequestState),
            MessageKind::SetProgram => Ok(Message::SetProgram {
                binary: reader.read_rest(),
            }),
            MessageKind::SetHeap => Ok(Message::SetHeap {
                heap: reader.read_rest(),
            }),
            MessageKind::Ping => Ok(Message::Ping {
                wall_clock_ms: reader.read_f64()?,
            }),
            MessageKind::Pong => Ok(Message::Pong {
                wall_clock_ms: reader.read_f64()?,
            }),
        }
    }

}
