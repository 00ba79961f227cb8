use thiserror::Error;

/// Errors that can occur while framing or parsing wire messages.
///
/// Decoding operates on untrusted network data: every malformed payload
/// maps to an error here instead of a panic, and the connection carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The datagram carried no kind byte at all
    #[error("empty datagram")]
    EmptyPayload,

    /// The kind byte does not name a known message kind
    #[error("unknown message kind byte {kind} (valid range: 0-6)")]
    UnknownKind { kind: u8 },

    /// The payload ended before a fixed-width field could be read
    #[error("unexpected end of payload (needed {needed} more bytes, {remaining} available)")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A call carried more arguments than the one-byte count can frame
    #[error("too many call arguments ({count}, limit 255)")]
    TooManyArguments { count: usize },
}
