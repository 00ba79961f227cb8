use std::collections::VecDeque;

use tangle_shared::{PeerId, RoomState};

use crate::call_arg::CallArg;

/// A unit of work for the coordinator's single execution lane.
///
/// Every mutating entry point (local call, remote datagram, membership
/// change, pacing tick, resync) becomes one of these, so all mutation
/// happens in one strict sequential order.
pub(crate) enum Command {
    LocalCall { name: String, args: Vec<CallArg> },
    RemoteMessage { from: PeerId, payload: Vec<u8> },
    PeerJoined { peer: PeerId },
    PeerLeft { peer: PeerId },
    RoomStateChanged { state: RoomState },
    ProgressTime { now_ms: f64 },
    Resync,
}

/// The lane itself: at most one task in flight, everything else queues in
/// FIFO order behind it.
///
/// Claim discipline: a caller that wins `try_claim` executes its task,
/// drains `next()` until empty, then releases. A caller that loses (or
/// that asked for enqueue-only) appends and returns; the running task's
/// drain loop will pick the work up.
pub(crate) struct CommandQueue {
    pending: VecDeque<Command>,
    lane_busy: bool,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            lane_busy: false,
        }
    }

    /// Try to claim the lane. Returns false while a task is running.
    pub fn try_claim(&mut self) -> bool {
        if self.lane_busy {
            return false;
        }
        self.lane_busy = true;
        true
    }

    pub fn release(&mut self) {
        self.lane_busy = false;
    }

    pub fn enqueue(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn next(&mut self) -> Option<Command> {
        self.pending.pop_front()
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
