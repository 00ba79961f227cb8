/// Stable hex digest of a module binary, truncated to 16 characters.
///
/// Appended to the room name so peers running mismatched binaries land in
/// different rooms instead of diverging inside the same one.
pub fn program_hash_hex(binary: &[u8]) -> String {
    let hash = blake3::hash(binary);
    hash.to_hex().as_str()[..16].to_string()
}
