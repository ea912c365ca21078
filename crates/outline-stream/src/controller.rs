use std::sync::Arc;

use futures::StreamExt as _;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use crate::errors::{StreamError, StreamFailure, failure_from_source_error};
use crate::framer::LineFramer;
use crate::outline::{DocumentId, OutlineItem};
use crate::session::{SessionAction, StreamSession};
use crate::source::{OutlineSource, StreamRequest};
use crate::store::OutlineDocument;
use crate::stream::OutlineUpdate;
use crate::streamer::StreamerInner;
use crate::wire::parse_record;

/// Handle used to request cancellation of a running outline stream.
#[derive(Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Requests cancellation.
    ///
    /// Best-effort: cancellation becomes visible as a terminal
    /// `OutlineUpdate::Cancelled`, never as a failure.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Streaming handle returned by `OutlineStreamer::stream`.
///
/// Use `next_update()` to consume snapshots as they arrive and `finish()`
/// to obtain the final outline after the terminal update.
pub struct OutlineStream {
    document_id: DocumentId,
    session_id: uuid::Uuid,
    rx: mpsc::Receiver<OutlineUpdate>,
    final_rx: oneshot::Receiver<Result<Vec<OutlineItem>, StreamError>>,
    cancel_handle: CancelHandle,
    saw_terminal: bool,
}

impl OutlineStream {
    /// Returns the document id this stream reconstructs.
    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    /// Returns the id of this stream attempt.
    pub fn session_id(&self) -> uuid::Uuid {
        self.session_id
    }

    /// Returns a handle that can cancel the stream.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel_handle.clone()
    }

    /// Waits for and returns the next update.
    ///
    /// Returns `None` after the update channel is closed.
    pub async fn next_update(&mut self) -> Option<OutlineUpdate> {
        let update = self.rx.recv().await;
        if update.as_ref().is_some_and(OutlineUpdate::is_terminal) {
            self.saw_terminal = true;
        }
        update
    }

    /// Drains the stream (if needed) and returns the final outline.
    ///
    /// Safe to call after consuming updates manually with `next_update()`.
    /// A cancelled stream yields `StreamError::Cancelled`.
    pub async fn finish(mut self) -> Result<Vec<OutlineItem>, StreamError> {
        while !self.saw_terminal {
            match self.rx.recv().await {
                Some(update) if update.is_terminal() => self.saw_terminal = true,
                Some(_) => {}
                None => break,
            }
        }

        match self.final_rx.await {
            Ok(result) => result,
            Err(_) => Err(StreamError::Protocol(format!(
                "stream task ended without final result (document={})",
                self.document_id
            ))),
        }
    }
}

pub(crate) fn spawn_stream(
    inner: Arc<StreamerInner>,
    source: Arc<dyn OutlineSource>,
    document_id: DocumentId,
    update_buffer: usize,
) -> OutlineStream {
    let session_id = uuid::Uuid::new_v4();
    let (tx, rx) = mpsc::channel(update_buffer);
    let (final_tx, final_rx) = oneshot::channel();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let cancel_handle = CancelHandle { tx: cancel_tx };

    tokio::spawn(stream_task(
        inner,
        source,
        StreamRequest {
            document_id: document_id.clone(),
            session_id,
        },
        tx,
        final_tx,
        cancel_rx,
    ));

    OutlineStream {
        document_id,
        session_id,
        rx,
        final_rx,
        cancel_handle,
        saw_terminal: false,
    }
}

async fn stream_task(
    inner: Arc<StreamerInner>,
    source: Arc<dyn OutlineSource>,
    request: StreamRequest,
    tx: mpsc::Sender<OutlineUpdate>,
    final_tx: oneshot::Sender<Result<Vec<OutlineItem>, StreamError>>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let document_id = request.document_id.clone();
    let session_id = request.session_id;
    let mut session = StreamSession::new(document_id.clone());

    let mut handle = match source.open(request).await {
        Ok(handle) => handle,
        Err(err) => {
            let action = session.fail(failure_from_source_error(&err));
            settle(&inner, &document_id, &tx, final_tx, action).await;
            return;
        }
    };
    session.start();
    debug!(document_id = %document_id, session_id = %session_id, "outline stream consuming");

    let mut framer = LineFramer::default();
    loop {
        tokio::select! {
            changed = cancel_rx.changed() => {
                match changed {
                    Ok(()) if *cancel_rx.borrow() => {
                        session.cancel();
                        debug!(
                            document_id = %document_id,
                            published = session.has_published(),
                            "outline stream cancelled"
                        );
                        let _ = send_update(&tx, OutlineUpdate::Cancelled).await;
                        inner.release(&document_id);
                        let _ = final_tx.send(Err(StreamError::Cancelled));
                        return;
                    }
                    Ok(()) => {}
                    Err(_) => {}
                }
            }
            next = handle.stream.next() => {
                match next {
                    Some(Ok(chunk)) => {
                        // each record runs to completion (decode, diff,
                        // publish) before the next transport read
                        for line in framer.push_chunk(&chunk) {
                            let Some(event) = parse_record(&line) else {
                                continue;
                            };
                            match session.apply(event) {
                                SessionAction::None => {}
                                SessionAction::Publish { items, active, high_water } => {
                                    let sent = send_update(
                                        &tx,
                                        OutlineUpdate::Snapshot { items, active, high_water },
                                    )
                                    .await;
                                    if !sent {
                                        inner.release(&document_id);
                                        let _ = final_tx.send(Err(StreamError::Protocol(
                                            "update receiver dropped during streaming".into(),
                                        )));
                                        return;
                                    }
                                }
                                action @ (SessionAction::Complete { .. }
                                | SessionAction::Fail(_)) => {
                                    settle(&inner, &document_id, &tx, final_tx, action).await;
                                    return;
                                }
                            }
                        }
                    }
                    Some(Err(err)) => {
                        let action = session.fail(failure_from_source_error(&err));
                        settle(&inner, &document_id, &tx, final_tx, action).await;
                        return;
                    }
                    None => {
                        let action = session.fail(StreamFailure::Transport {
                            message: "stream ended before completion".into(),
                        });
                        settle(&inner, &document_id, &tx, final_tx, action).await;
                        return;
                    }
                }
            }
        }
    }
}

async fn settle(
    inner: &StreamerInner,
    document_id: &DocumentId,
    tx: &mpsc::Sender<OutlineUpdate>,
    final_tx: oneshot::Sender<Result<Vec<OutlineItem>, StreamError>>,
    action: SessionAction,
) {
    match action {
        SessionAction::Complete { items } => {
            inner.deposit(document_id, OutlineDocument::from_items(items.clone()));
            debug!(document_id = %document_id, items = items.len(), "outline stream completed");
            let _ = send_update(tx, OutlineUpdate::Completed { items: items.clone() }).await;
            inner.release(document_id);
            let _ = final_tx.send(Ok(items));
        }
        SessionAction::Fail(failure) => {
            warn!(document_id = %document_id, %failure, "outline stream failed");
            let _ = send_update(
                tx,
                OutlineUpdate::Failed {
                    failure: failure.clone(),
                },
            )
            .await;
            inner.release(document_id);
            let _ = final_tx.send(Err(StreamError::StreamFailed(failure)));
        }
        SessionAction::None | SessionAction::Publish { .. } => {
            inner.release(document_id);
            let _ = final_tx.send(Err(StreamError::Protocol(
                "stream task settled without a terminal action".into(),
            )));
        }
    }
}

async fn send_update(tx: &mpsc::Sender<OutlineUpdate>, update: OutlineUpdate) -> bool {
    tx.send(update).await.is_ok()
}
