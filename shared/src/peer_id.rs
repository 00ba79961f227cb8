use std::fmt;

/// Identifies a peer within a room.
///
/// Ids are opaque and totally ordered. The only arithmetic the protocol
/// performs on them is the wrapping distance used to elect a departure
/// successor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(u64);

impl PeerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The id's numeric form, as handed to module calls in place of the
    /// user-id argument sentinel. Lossy above 2^53; room implementations
    /// are expected to assign ids well below that.
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    /// Wrapping signed distance from `other` to `self`.
    ///
    /// signed_distance(5, 2) is 3; signed_distance(1, 2) is -1, including
    /// across the u64 wrap boundary.
    pub fn signed_distance(self, other: PeerId) -> i64 {
        self.0.wrapping_sub(other.0) as i64
    }

    /// How far above `base` this id sits, walking the id space cyclically.
    fn cyclic_distance_above(self, base: PeerId) -> u64 {
        self.0.wrapping_sub(base.0)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// Elects the single peer responsible for announcing `departed`'s
/// departure: the remaining peer (the caller includes itself) closest
/// above the departed id.
///
/// "Above" wraps around the id space, so a departure always has exactly
/// one winner as long as any peer remains. Every peer observes the same
/// departure and applies the same election, so exactly one of them makes
/// the authoritative `peer_left` call. Returns `None` when `remaining`
/// is empty.
pub fn successor_of<I>(remaining: I, departed: PeerId) -> Option<PeerId>
where
    I: IntoIterator<Item = PeerId>,
{
    remaining
        .into_iter()
        .filter(|peer| *peer != departed)
        .min_by_key(|peer| peer.cyclic_distance_above(departed))
}
