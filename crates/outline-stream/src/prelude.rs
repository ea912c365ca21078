//! Common imports for typical streaming usage.
//!
//! This module intentionally exports the most frequently used builder and
//! runtime types so examples and application code need fewer import lines.
pub use crate::{
    CancelHandle, DocumentId, OutlineDocument, OutlineItem, OutlineStream, OutlineStreamer,
    OutlineStreamerBuilder, OutlineUpdate, SlideEntry, SourceError, StreamError, StreamFailure,
};
