use thiserror::Error;

use crate::time::{SimTime, TimeStamp};

/// Errors surfaced by a deterministic execution engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeMachineError {
    /// The engine kept no snapshot early enough to roll back to `time`
    #[error("no snapshot available at or before simulation time {time}")]
    MissingSnapshot { time: SimTime },

    /// The module trapped while executing an export
    #[error("module trapped in export {function_index}: {reason}")]
    Trap { function_index: u32, reason: String },

    /// A received heap blob could not be decoded into engine state
    #[error("malformed heap snapshot ({reason})")]
    MalformedHeap { reason: String },
}

/// A single-peer deterministic execution engine with snapshot and
/// rollback, driving one loaded module.
///
/// The coordinator treats the engine as a collaborator: it owns its own
/// history and snapshots, while the coordinator decides *when* calls
/// execute, how far time advances, and which history is safe to discard.
///
/// Implementations must order committed calls by their [`TimeStamp`]
/// regardless of arrival order, re-executing history when a call lands in
/// the past. A call whose time stamp is already present in history is a
/// duplicate delivery and must be ignored.
pub trait TimeMachine {
    /// Resolve an exported function by name.
    fn function_export_index(&self, name: &str) -> Option<u32>;

    /// Name of the export at `index`, when known.
    fn function_name(&self, index: u32) -> Option<&str>;

    /// Execute an export at the given logical time, rolling back and
    /// re-applying history as needed. `authoritative` calls commit to
    /// history; non-authoritative ones may be discarded on conflict.
    fn call_with_time_stamp(
        &mut self,
        function_index: u32,
        args: &[f64],
        time_stamp: TimeStamp,
        authoritative: bool,
    ) -> Result<(), TimeMachineError>;

    /// Execute an export speculatively and revert every effect. Useful
    /// for pure queries and rendering reads.
    fn call_and_revert(
        &mut self,
        function_index: u32,
        args: &[f64],
    ) -> Result<(), TimeMachineError>;

    /// Advance the target time by `delta_ms` without simulating.
    fn progress_time(&mut self, delta_ms: SimTime);

    /// Simulate one interval toward the target time. Returns false once
    /// the engine has caught up and no work remains.
    fn step(&mut self) -> bool;

    /// Record a snapshot at the current simulation time.
    fn take_snapshot(&mut self);

    /// Discard history strictly before `time`. A lower-bound hint: the
    /// caller already subtracts a safety cushion, and engines that
    /// snapshot on rollback may retain more.
    fn remove_history_before(&mut self, time: SimTime);

    /// The time the simulation is trying to reach.
    fn target_time(&self) -> SimTime;

    /// The time the simulation has actually reached.
    fn current_simulation_time(&self) -> SimTime;

    /// Fixed step interval in ms, or None when running variable-step.
    fn fixed_update_interval(&self) -> Option<SimTime>;

    /// Serialize the complete engine state.
    fn encode_heap(&self) -> Vec<u8>;

    /// Replace the complete engine state with a decoded heap.
    fn apply_heap(&mut self, heap: &[u8]) -> Result<(), TimeMachineError>;

    /// Read raw bytes out of module memory.
    fn read_memory(&self, address: usize, length: usize) -> Vec<u8>;

    /// Read a UTF-8 string out of module memory.
    fn read_string(&self, address: usize, length: usize) -> String;
}
