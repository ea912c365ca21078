//! Progressive reconstruction of a streamed outline document.
//!
//! Consumes a chunked generation event stream and republishes decoded
//! outline snapshots, with forward-only progress pointers, before the
//! stream completes. Intermediate buffers are almost always truncated JSON;
//! a structural repair pass makes them decodable without ever failing the
//! stream on an incomplete read.
//!
//! # Builder-first usage (HTTP source)
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use outline_stream::prelude::*;
//! use outline_stream::sources::http::HttpOutlineSource;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), StreamError> {
//! let streamer = OutlineStreamer::builder()
//!     .source(Arc::new(HttpOutlineSource::from_env()?))
//!     .build()?;
//!
//! let Some(mut stream) = streamer.stream("pres-42") else {
//!     return Ok(()); // already streaming or finalized
//! };
//! while let Some(update) = stream.next_update().await {
//!     if let OutlineUpdate::Snapshot { items, active, .. } = update {
//!         println!("{} items, writing {active:?}", items.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Stream handle, cancellation handle, and the session drive task.
pub mod controller;
/// Snapshot differ and forward-only progress pointers.
pub mod diff;
/// Public error types used by the streaming API.
pub mod errors;
/// Newline framing of the raw transport buffer.
pub mod framer;
/// Document and outline item types.
pub mod outline;
/// Common imports for typical usage.
pub mod prelude;
/// Repair-parse of truncated outline payloads.
pub mod repair;
/// Session state machine.
pub mod session;
/// Source (transport) contracts used by the stream core.
pub mod source;
/// Bundled source implementations.
pub mod sources;
/// Finalized outline store with index-preserving mutation.
pub mod store;
/// Public update events delivered to consumers.
pub mod stream;
/// Streamer entry point and builder.
pub mod streamer;
/// Wire records and event classification.
pub mod wire;

pub use controller::{CancelHandle, OutlineStream};
pub use diff::{StreamPointers, first_changed_index};
pub use errors::{SourceError, StreamError, StreamFailure};
pub use framer::LineFramer;
pub use outline::{DocumentId, OutlineItem};
pub use repair::{DecodeResult, decode_outline, repair_truncated};
pub use session::StreamState;
pub use source::{ChunkStream, OutlineSource, SourceStreamHandle, StreamRequest};
pub use store::{OutlineDocument, SlideEntry};
pub use stream::OutlineUpdate;
pub use streamer::{OutlineStreamer, OutlineStreamerBuilder};
pub use wire::{WireEvent, parse_record};
