/// Configures compression of heap-transfer payloads.
///
/// Only the SetHeap blob is ever compressed; framing bytes and the small
/// fixed-width messages stay uncompressed. Compression requires the
/// `zstd_support` feature; without it the mode is accepted and ignored.
#[derive(Clone, Default)]
pub struct CompressionConfig {
    /// Compression applied to outgoing (and expected on incoming) heaps
    pub heap: Option<CompressionMode>,
}

#[derive(Clone)]
pub enum CompressionMode {
    /// zstd at the given compression level
    Default(i32),
    /// zstd at the given level with a pre-trained dictionary
    Dictionary(i32, Vec<u8>),
}
