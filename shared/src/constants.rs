use crate::time::SimTime;

/// Offset added to each local call issued within a single wall-clock
/// frame, keeping per-peer time stamps strictly increasing. Reset to zero
/// whenever wall-clock time advances, so the accumulated offset stays
/// negligible for bounded bursts (10,000 calls in one frame stay within
/// one millisecond of simulated time).
pub const MESSAGE_TIME_OFFSET_STEP: SimTime = 1e-4;

/// A peer whose target time has run this far ahead of what it has managed
/// to simulate is lagging beyond the rollback-safe horizon and re-requests
/// the heap instead of trying to catch up.
pub const DIVERGENCE_LIMIT_MS: SimTime = 2000.0;

/// Share of the elapsed frame time the pacing loop may spend stepping the
/// simulation before yielding back to the embedder.
pub const STEP_BUDGET_RATIO: f64 = 0.7;

/// Slack subtracted from the pruning watermark. Snapshots exactly at the
/// boundary are not always available; see DESIGN.md.
pub const PRUNE_CUSHION_MS: SimTime = 50.0;

/// A peer that has heard nothing from us for this much simulated time gets
/// a TimeProgressed hint so its pruning watermark keeps advancing.
pub const KEEP_ALIVE_INTERVAL_MS: SimTime = 200.0;
