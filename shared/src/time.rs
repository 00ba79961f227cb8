use crate::peer_id::PeerId;

/// Simulation time, in the same millisecond units the execution engine
/// advances in. Distinct from wall-clock milliseconds: the two must never
/// be mixed.
pub type SimTime = f64;

/// Total-order key for call execution.
///
/// Calls are ordered by `(time, player_id)`; the peer id breaks ties
/// between simultaneous calls from different peers. Locally issued stamps
/// are kept strictly increasing by a small per-frame offset, so two stamps
/// from one peer never compare equal.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct TimeStamp {
    pub time: SimTime,
    pub player_id: PeerId,
}

impl TimeStamp {
    pub fn new(time: SimTime, player_id: PeerId) -> Self {
        Self { time, player_id }
    }
}
