use thiserror::Error;

/// Errors that can occur while compressing an outgoing heap blob
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderError {
    /// Failed to create compressor with the specified configuration
    #[error("Failed to create compressor with compression level {level}")]
    CompressorCreationFailed { level: i32 },

    /// Compression operation failed
    #[error("Failed to compress payload of {payload_size} bytes")]
    CompressionFailed { payload_size: usize },
}

/// Errors that can occur while decompressing a received heap blob
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoderError {
    /// Failed to create decompressor
    #[error("Failed to create decompressor")]
    DecompressorCreationFailed,

    /// Failed to calculate upper bound for decompression
    #[error("Failed to calculate upper bound for payload of {payload_size} bytes")]
    UpperBoundCalculationFailed { payload_size: usize },

    /// Decompression operation failed (possibly a malformed or malicious payload)
    #[error("Failed to decompress payload of {payload_size} bytes (possible malformed or malicious data)")]
    DecompressionFailed { payload_size: usize },
}
