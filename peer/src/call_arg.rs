/// An argument to a module call.
///
/// Everything travels the wire as f64; the enum exists so callers can pass
/// the user-id sentinel without knowing their own peer id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallArg {
    /// A plain numeric argument
    Number(f64),
    /// Replaced with the local peer id's numeric form before the call
    /// executes or is broadcast. Remote peers receive the substituted
    /// value baked into the args and nothing re-checks it on arrival, so
    /// embedders that need trustworthy caller identity must authenticate
    /// at the room layer.
    UserId,
}

impl From<f64> for CallArg {
    fn from(value: f64) -> Self {
        CallArg::Number(value)
    }
}

impl From<i32> for CallArg {
    fn from(value: i32) -> Self {
        CallArg::Number(value.into())
    }
}
