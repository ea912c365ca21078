use crate::errors::StreamFailure;
use crate::outline::OutlineItem;

/// Progress updates published to the consumer of one outline stream.
///
/// Exactly one terminal variant (`Completed`, `Failed`, or `Cancelled`) is
/// delivered per session; no snapshot follows it. A snapshot already
/// delivered stays valid even when a later update is a failure.
#[derive(Clone, Debug, PartialEq)]
pub enum OutlineUpdate {
    /// A successful intermediate decode of the accumulated payload.
    Snapshot {
        /// Full ordered outline decoded so far.
        items: Vec<OutlineItem>,
        /// Item currently believed to be under active generation.
        active: Option<usize>,
        /// Highest active index reached this session, `-1` before the first.
        high_water: i64,
    },
    /// Terminal success with the final outline.
    Completed { items: Vec<OutlineItem> },
    /// Terminal failure.
    Failed { failure: StreamFailure },
    /// Terminal caller-initiated cancellation. Not a failure.
    Cancelled,
}

impl OutlineUpdate {
    /// Whether this update ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled
        )
    }
}
