//! Seams between the coordinator and the host: text generation, annotation
//! rendering, and chat access. Hosts implement these; the coordinator never
//! touches markup or storage directly.

use crate::shared::{ChatMessage, FeedbackRecord, MessageId};
use std::fmt;

/// Failure of the single opaque generation call. Not retried; the coordinator
/// clears any pending indicator and propagates this to the dispatcher's caller.
#[derive(Debug, Clone)]
pub struct GenerationError(String);

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generation failed: {}", self.0)
    }
}

impl std::error::Error for GenerationError {}

/// The host's text-generation backend behind one asynchronous call.
/// No retry, batching, streaming, or timeout is assumed.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Rendering port for per-message feedback affordances and annotations.
/// Implemented by a host-specific adapter (DOM, console, ...).
pub trait AnnotationView: Send + Sync {
    /// Attach the request/delete controls to a message's container.
    fn attach_controls(&self, id: MessageId);

    /// Show a transient loading indicator in place of the annotation.
    fn show_pending(&self, id: MessageId);

    /// Attach or replace the annotation with the given feedback text,
    /// optionally folded shut.
    fn attach_annotation(&self, id: MessageId, feedback: &str, folded: bool);

    /// Remove the annotation and any indicator for a message.
    fn clear_annotation(&self, id: MessageId);

    /// Surface an informational message to the user.
    fn notify(&self, text: &str);
}

/// View into the host's ordered, mutable chat sequence.
///
/// Messages are owned by the host; the only mutation this component performs
/// through the port is writing or removing a message's feedback record.
pub trait ChatAccess: Send + Sync {
    /// Whether a conversation is currently loaded at all.
    fn is_loaded(&self) -> bool;

    /// Snapshot of one message by ordinal, if it exists.
    fn message(&self, id: MessageId) -> Option<ChatMessage>;

    /// Snapshot of up to `limit` messages immediately preceding `id`, in
    /// chronological order (oldest first).
    fn preceding(&self, id: MessageId, limit: usize) -> Vec<ChatMessage>;

    /// Ordinals of every message in the current conversation.
    fn message_ids(&self) -> Vec<MessageId>;

    /// Writes or removes a message's feedback record. Returns false when the
    /// message does not exist.
    fn set_feedback(&self, id: MessageId, record: Option<FeedbackRecord>) -> bool;

    /// Asks the host to persist the chat; the host debounces actual flushes.
    fn request_save(&self);
}
