use tangle_shared::CompressionConfig;

use crate::lifecycle::StateChangeCallback;

/// Contains Config properties which will be used by the coordinator
pub struct TangleConfig {
    /// Base room name; the program hash is appended so peers with
    /// mismatched binaries never share a room.
    pub room_name: String,
    /// Whether a SetProgram message from a peer may replace the loaded
    /// module. Reserved: the swap itself is not implemented yet.
    pub accept_new_programs: bool,
    /// Compression applied to heap transfers
    pub compression: CompressionConfig,
    /// Observer for lifecycle transitions
    pub on_state_change: Option<StateChangeCallback>,
}

impl Default for TangleConfig {
    fn default() -> Self {
        Self {
            room_name: "tangle".to_string(),
            accept_new_programs: false,
            compression: CompressionConfig::default(),
            on_state_change: None,
        }
    }
}
