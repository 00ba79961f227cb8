/// Lifecycle of a coordinator within its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TangleState {
    /// No transport, or a transport we have not bootstrapped over yet
    Disconnected,
    /// A full state dump has been requested; incoming calls are buffered
    /// until it lands
    RequestingHeap,
    /// Calls execute immediately and heap requests are served
    Connected,
}

/// Invoked once per lifecycle transition.
pub type StateChangeCallback = Box<dyn FnMut(TangleState)>;
