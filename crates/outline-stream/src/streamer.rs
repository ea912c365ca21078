use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::controller::{OutlineStream, spawn_stream};
use crate::errors::StreamError;
use crate::outline::DocumentId;
use crate::source::OutlineSource;
use crate::store::OutlineDocument;

const DEFAULT_UPDATE_BUFFER: usize = 128;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct StreamerInner {
    documents: Mutex<HashMap<DocumentId, OutlineDocument>>,
    active: Mutex<HashSet<DocumentId>>,
}

impl StreamerInner {
    fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            active: Mutex::new(HashSet::new()),
        }
    }

    /// Claims the per-document streaming slot.
    ///
    /// Fails when a session is already active for the id or a finalized
    /// outline already exists for it; the caller treats that as a no-op.
    pub(crate) fn try_claim(&self, id: &DocumentId) -> bool {
        if lock(&self.documents).contains_key(id) {
            return false;
        }
        lock(&self.active).insert(id.clone())
    }

    pub(crate) fn release(&self, id: &DocumentId) {
        lock(&self.active).remove(id);
    }

    pub(crate) fn deposit(&self, id: &DocumentId, document: OutlineDocument) {
        lock(&self.documents).insert(id.clone(), document);
    }

    fn document(&self, id: &DocumentId) -> Option<OutlineDocument> {
        lock(&self.documents).get(id).cloned()
    }

    fn update_document<F>(&self, id: &DocumentId, mutate: F) -> bool
    where
        F: FnOnce(&mut OutlineDocument),
    {
        let mut documents = lock(&self.documents);
        match documents.get_mut(id) {
            Some(document) => {
                mutate(document);
                true
            }
            None => false,
        }
    }

    fn clear_document(&self, id: &DocumentId) -> bool {
        lock(&self.documents).remove(id).is_some()
    }
}

/// Entry point for starting outline streams and working with finalized
/// outlines.
#[derive(Clone)]
pub struct OutlineStreamer {
    pub(crate) inner: Arc<StreamerInner>,
    source: Arc<dyn OutlineSource>,
    update_buffer: usize,
}

impl OutlineStreamer {
    /// Starts a builder for configuring an `OutlineStreamer`.
    pub fn builder() -> OutlineStreamerBuilder {
        OutlineStreamerBuilder::default()
    }

    /// Starts streaming the outline for `document_id`.
    ///
    /// Returns `None` when a session is already active for the id or a
    /// finalized outline already exists for it — the check happens before
    /// any transport is opened. Must be called within a tokio runtime.
    pub fn stream(&self, document_id: impl Into<DocumentId>) -> Option<OutlineStream> {
        let document_id = document_id.into();
        if !self.inner.try_claim(&document_id) {
            debug!(document_id = %document_id, "outline already streaming or finalized; not starting");
            return None;
        }
        Some(spawn_stream(
            self.inner.clone(),
            self.source.clone(),
            document_id,
            self.update_buffer,
        ))
    }

    /// Returns a clone of the finalized outline for `document_id`.
    pub fn document(&self, document_id: &DocumentId) -> Option<OutlineDocument> {
        self.inner.document(document_id)
    }

    /// Applies a mutation (insert/remove) to the finalized outline for
    /// `document_id` under the registry lock.
    ///
    /// Returns `false` when no finalized outline exists for the id.
    pub fn update_document<F>(&self, document_id: &DocumentId, mutate: F) -> bool
    where
        F: FnOnce(&mut OutlineDocument),
    {
        self.inner.update_document(document_id, mutate)
    }

    /// Drops the finalized outline, allowing a fresh stream for the id.
    pub fn clear_document(&self, document_id: &DocumentId) -> bool {
        self.inner.clear_document(document_id)
    }
}

/// Builder used to register a source before creating an `OutlineStreamer`.
pub struct OutlineStreamerBuilder {
    source: Option<Arc<dyn OutlineSource>>,
    update_buffer: usize,
}

impl Default for OutlineStreamerBuilder {
    fn default() -> Self {
        Self {
            source: None,
            update_buffer: DEFAULT_UPDATE_BUFFER,
        }
    }
}

impl OutlineStreamerBuilder {
    /// Sets the transport that feeds outline sessions.
    pub fn source(mut self, source: Arc<dyn OutlineSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the bounded update buffer size used between the stream task and
    /// the consumer.
    pub fn update_buffer_capacity(mut self, capacity: usize) -> Self {
        self.update_buffer = capacity;
        self
    }

    /// Validates the configuration and builds the streamer.
    pub fn build(self) -> Result<OutlineStreamer, StreamError> {
        let source = self
            .source
            .ok_or_else(|| StreamError::Config("an outline source must be provided".into()))?;
        if self.update_buffer == 0 {
            return Err(StreamError::Config(
                "update_buffer_capacity must be greater than 0".into(),
            ));
        }
        Ok(OutlineStreamer {
            inner: Arc::new(StreamerInner::new()),
            source,
            update_buffer: self.update_buffer,
        })
    }
}
