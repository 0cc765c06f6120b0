/// Time primitives
///
/// Timestamps are milliseconds on a monotonic clock owned by the caller
/// (e.g. `performance.now()` or `Instant` elapsed). Interaction code only ever
/// compares two of them, so the epoch is irrelevant.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Timestamp(pub f64); // milliseconds

impl Timestamp {
    pub fn from_millis(ms: f64) -> Self {
        Self(ms)
    }

    /// Milliseconds elapsed since `earlier`; never negative.
    pub fn elapsed_since(self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}
