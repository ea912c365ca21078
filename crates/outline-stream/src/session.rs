use tracing::debug;

use crate::diff::{StreamPointers, first_changed_index};
use crate::errors::StreamFailure;
use crate::outline::{DocumentId, OutlineItem};
use crate::repair::{DecodeResult, decode_outline};
use crate::wire::WireEvent;

/// Lifecycle of one stream session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// Session created, transport not yet delivering.
    Idle,
    /// Consuming events.
    Streaming,
    /// Terminal: final outline delivered.
    Completed,
    /// Terminal: decode, upstream, or transport failure.
    Failed,
    /// Terminal: caller-initiated cancellation.
    Cancelled,
}

impl StreamState {
    /// Terminal states accept no further events.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Observable outcome of applying one wire event to a session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SessionAction {
    /// Nothing observable happened.
    None,
    /// Publish an intermediate snapshot.
    Publish {
        items: Vec<OutlineItem>,
        active: Option<usize>,
        high_water: i64,
    },
    /// Session finished; publish the final outline.
    Complete { items: Vec<OutlineItem> },
    /// Session failed terminally.
    Fail(StreamFailure),
}

/// All mutable state for one in-flight outline stream: the args buffer,
/// progress pointers, the previously published snapshot, and the
/// state-machine state.
///
/// Owned and driven by a single task. Events are applied strictly in
/// arrival order and each application runs to completion before the next,
/// so no interior locking is needed.
pub(crate) struct StreamSession {
    document_id: DocumentId,
    state: StreamState,
    args: String,
    pointers: StreamPointers,
    prev: Vec<OutlineItem>,
    published: bool,
}

impl StreamSession {
    pub fn new(document_id: DocumentId) -> Self {
        Self {
            document_id,
            state: StreamState::Idle,
            args: String::new(),
            pointers: StreamPointers::new(),
            prev: Vec::new(),
            published: false,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Whether at least one snapshot was published this session.
    pub fn has_published(&self) -> bool {
        self.published
    }

    /// Transport is live; begin accepting events.
    pub fn start(&mut self) {
        if self.state == StreamState::Idle {
            self.state = StreamState::Streaming;
        }
    }

    /// Marks the session cancelled. Pointers and the last-published
    /// snapshot are deliberately left untouched.
    pub fn cancel(&mut self) {
        if !self.state.is_terminal() {
            self.state = StreamState::Cancelled;
        }
    }

    /// Terminates the session with a failure, resetting the pointers.
    ///
    /// Used for upstream error events and for transport-level failures that
    /// never appear as wire events.
    pub fn fail(&mut self, failure: StreamFailure) -> SessionAction {
        self.pointers.reset();
        self.state = StreamState::Failed;
        SessionAction::Fail(failure)
    }

    /// Applies one wire event and returns what the caller should publish.
    ///
    /// Terminal sessions absorb events without effect. Incomplete decodes
    /// are expected on most deltas and produce nothing observable.
    pub fn apply(&mut self, event: WireEvent) -> SessionAction {
        if self.state != StreamState::Streaming {
            return SessionAction::None;
        }
        match event {
            WireEvent::RunStarted | WireEvent::MessageStart | WireEvent::MessageEnd => {
                SessionAction::None
            }
            WireEvent::ToolCallStart => {
                self.args.clear();
                SessionAction::None
            }
            WireEvent::ToolCallArgs { delta } => {
                self.args.push_str(&delta);
                match decode_outline(&self.args) {
                    DecodeResult::Decoded(items) => {
                        let changed = first_changed_index(&self.prev, &items);
                        self.pointers.advance(changed);
                        self.prev = items.clone();
                        self.published = true;
                        debug!(
                            document_id = %self.document_id,
                            items = items.len(),
                            changed = ?changed,
                            "decoded outline snapshot"
                        );
                        SessionAction::Publish {
                            items,
                            active: self.pointers.active,
                            high_water: self.pointers.high_water,
                        }
                    }
                    DecodeResult::Incomplete => SessionAction::None,
                }
            }
            WireEvent::ToolCallEnd => match decode_outline(&self.args) {
                DecodeResult::Decoded(items) => {
                    self.pointers.reset();
                    self.prev = items.clone();
                    self.state = StreamState::Completed;
                    SessionAction::Complete { items }
                }
                DecodeResult::Incomplete => self.fail(StreamFailure::Decode {
                    message: format!(
                        "final args buffer ({} bytes) is not a valid outline payload",
                        self.args.len()
                    ),
                }),
            },
            WireEvent::Error { detail } => self.fail(StreamFailure::Upstream { detail }),
            WireEvent::StreamDone => {
                self.pointers.reset();
                self.state = StreamState::Completed;
                SessionAction::Complete {
                    items: self.prev.clone(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming_session() -> StreamSession {
        let mut session = StreamSession::new(DocumentId::new("doc-1"));
        session.start();
        session
    }

    fn args(delta: &str) -> WireEvent {
        WireEvent::ToolCallArgs {
            delta: delta.to_string(),
        }
    }

    #[test]
    fn idle_sessions_ignore_events_until_started() {
        let mut session = StreamSession::new(DocumentId::new("doc-1"));
        assert_eq!(session.apply(WireEvent::RunStarted), SessionAction::None);
        assert_eq!(session.state(), StreamState::Idle);
        session.start();
        assert_eq!(session.state(), StreamState::Streaming);
    }

    #[test]
    fn control_markers_are_no_ops() {
        let mut session = streaming_session();
        assert_eq!(session.apply(WireEvent::RunStarted), SessionAction::None);
        assert_eq!(session.apply(WireEvent::MessageStart), SessionAction::None);
        assert_eq!(session.apply(WireEvent::MessageEnd), SessionAction::None);
        assert_eq!(session.state(), StreamState::Streaming);
    }

    #[test]
    fn deltas_accumulate_and_publish_on_each_successful_decode() {
        let mut session = streaming_session();
        session.apply(WireEvent::ToolCallStart);

        let first = session.apply(args("{\"slides\":[{\"content\":\"A\"}"));
        assert_eq!(
            first,
            SessionAction::Publish {
                items: vec![OutlineItem::new("A")],
                active: Some(0),
                high_water: 0,
            }
        );
        assert!(session.has_published());

        // buffer is mid-key here, nothing observable
        let second = session.apply(args(",{\"content"));
        assert_eq!(second, SessionAction::None);

        let third = session.apply(args("\":\"B\"}]}"));
        assert_eq!(
            third,
            SessionAction::Publish {
                items: vec![OutlineItem::new("A"), OutlineItem::new("B")],
                active: Some(1),
                high_water: 1,
            }
        );
    }

    #[test]
    fn tool_call_start_clears_the_args_buffer() {
        let mut session = streaming_session();
        session.apply(WireEvent::ToolCallStart);
        session.apply(args("{\"slides\":[{\"content\":\"stale\""));
        session.apply(WireEvent::ToolCallStart);
        let action = session.apply(args("{\"slides\":[{\"content\":\"fresh\"}]}"));
        assert!(matches!(
            action,
            SessionAction::Publish { ref items, .. } if items == &vec![OutlineItem::new("fresh")]
        ));
    }

    #[test]
    fn active_never_regresses_when_an_earlier_item_is_edited_late() {
        let mut session = streaming_session();
        session.apply(WireEvent::ToolCallStart);
        session.apply(args("{\"slides\":[{\"content\":\"A\"}"));
        session.apply(args(",{\"content\":\"B\"}"));
        // second item is active; a rewrite arriving for the first item
        // must not move the cursor backwards
        session.apply(WireEvent::ToolCallStart);
        let action = session.apply(args("{\"slides\":[{\"content\":\"A2\"}"));
        assert_eq!(
            action,
            SessionAction::Publish {
                items: vec![OutlineItem::new("A2")],
                active: Some(1),
                high_water: 1,
            }
        );
    }

    #[test]
    fn tool_call_end_completes_with_the_final_decode_and_resets_pointers() {
        let mut session = streaming_session();
        session.apply(WireEvent::ToolCallStart);
        session.apply(args("{\"slides\":[{\"content\":\"A\"}"));
        let action = session.apply(WireEvent::ToolCallEnd);
        assert_eq!(
            action,
            SessionAction::Complete {
                items: vec![OutlineItem::new("A")],
            }
        );
        assert_eq!(session.state(), StreamState::Completed);
    }

    #[test]
    fn tool_call_end_on_an_undecodable_buffer_fails_with_decode() {
        let mut session = streaming_session();
        session.apply(WireEvent::ToolCallStart);
        session.apply(args("not an outline payload"));
        let action = session.apply(WireEvent::ToolCallEnd);
        assert!(matches!(
            action,
            SessionAction::Fail(StreamFailure::Decode { .. })
        ));
        assert_eq!(session.state(), StreamState::Failed);
    }

    #[test]
    fn upstream_error_event_fails_the_session_with_its_detail() {
        let mut session = streaming_session();
        let action = session.apply(WireEvent::Error {
            detail: "generation failed".to_string(),
        });
        assert_eq!(
            action,
            SessionAction::Fail(StreamFailure::Upstream {
                detail: "generation failed".to_string(),
            })
        );
        assert_eq!(session.state(), StreamState::Failed);
    }

    #[test]
    fn stream_done_completes_with_the_last_published_snapshot() {
        let mut session = streaming_session();
        session.apply(WireEvent::ToolCallStart);
        session.apply(args("{\"slides\":[{\"content\":\"A\"}"));
        let action = session.apply(WireEvent::StreamDone);
        assert_eq!(
            action,
            SessionAction::Complete {
                items: vec![OutlineItem::new("A")],
            }
        );
    }

    #[test]
    fn terminal_sessions_absorb_further_events() {
        let mut session = streaming_session();
        session.apply(WireEvent::StreamDone);
        assert_eq!(session.state(), StreamState::Completed);
        assert_eq!(
            session.apply(args("{\"slides\":[{\"content\":\"late\"}]}")),
            SessionAction::None
        );
        assert_eq!(session.apply(WireEvent::ToolCallEnd), SessionAction::None);
    }

    #[test]
    fn cancel_leaves_state_for_the_consumer_but_stops_the_machine() {
        let mut session = streaming_session();
        session.apply(WireEvent::ToolCallStart);
        session.apply(args("{\"slides\":[{\"content\":\"A\"}"));
        session.cancel();
        assert_eq!(session.state(), StreamState::Cancelled);
        assert!(session.has_published());
        assert_eq!(session.apply(WireEvent::StreamDone), SessionAction::None);
    }

    #[test]
    fn payload_without_slides_stays_unobservable() {
        let mut session = streaming_session();
        session.apply(WireEvent::ToolCallStart);
        let action = session.apply(args("{\"title\":\"deck\"}"));
        assert_eq!(action, SessionAction::None);
        assert!(!session.has_published());
    }
}
