use std::pin::Pin;

use crate::errors::SourceError;
use crate::outline::DocumentId;

/// Raw UTF-8 text chunks delivered by a source; framing happens in the core.
pub type ChunkStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, SourceError>> + Send + 'static>>;

/// Request handed to a source when a session opens its transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamRequest {
    /// Target document the outline is generated for.
    pub document_id: DocumentId,
    /// Unique id for this stream attempt, used for log correlation.
    pub session_id: uuid::Uuid,
}

/// Live transport handle returned by `OutlineSource::open`.
pub struct SourceStreamHandle {
    /// The event-stream bytes.
    pub stream: ChunkStream,
}

/// Contract between the stream core and the transport that feeds it.
///
/// The core never reconnects: a dropped stream surfaces as a terminal
/// transport failure and the caller restarts a fresh session.
#[async_trait::async_trait]
pub trait OutlineSource: Send + Sync {
    /// Opens the event stream for one document.
    async fn open(&self, request: StreamRequest) -> Result<SourceStreamHandle, SourceError>;
}
