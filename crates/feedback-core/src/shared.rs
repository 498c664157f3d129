//! Shared types used across the feedback crates.

use serde::{Deserialize, Serialize};

/// Ordinal identifier of a message inside the host's chat sequence.
pub type MessageId = usize;

/// Key under which the feedback record lives in a message's extension bag.
pub const FEEDBACK_EXTRA_KEY: &str = "inputFeedback";

/// One turn of the host-owned conversation, as seen by this component.
///
/// The host owns the record; this component only ever adds or removes the
/// [`FEEDBACK_EXTRA_KEY`] entry in `extra` and never creates or destroys the
/// message itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name of the author.
    pub name: String,
    /// True when the turn was authored by the user (as opposed to the counterpart).
    pub is_user: bool,
    /// Current text content of the turn.
    pub text: String,
    /// Open-ended extension bag owned by the host. May be `null` or any shape;
    /// writes defensively initialize it to an object first.
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl ChatMessage {
    /// Convenience constructor for a turn with an empty extension bag.
    pub fn new(name: impl Into<String>, is_user: bool, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_user,
            text: text.into(),
            extra: serde_json::Value::Null,
        }
    }

    /// Returns the stored feedback record, if the extension bag carries one.
    pub fn feedback(&self) -> Option<FeedbackRecord> {
        self.extra
            .get(FEEDBACK_EXTRA_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Writes or removes the feedback record in the extension bag.
    /// A missing or non-object bag is initialized to an empty object first.
    pub fn set_feedback(&mut self, record: Option<FeedbackRecord>) {
        if !self.extra.is_object() {
            self.extra = serde_json::Value::Object(serde_json::Map::new());
        }
        if let Some(bag) = self.extra.as_object_mut() {
            match record {
                Some(rec) => {
                    let value = serde_json::to_value(&rec)
                        .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));
                    bag.insert(FEEDBACK_EXTRA_KEY.to_string(), value);
                }
                None => {
                    bag.remove(FEEDBACK_EXTRA_KEY);
                }
            }
        }
    }

    /// Returns whether the stored record (if any) was produced from text that
    /// no longer matches the current message text.
    pub fn feedback_is_stale(&self) -> bool {
        self.feedback()
            .map(|rec| rec.source_text != self.text)
            .unwrap_or(false)
    }
}

/// Stored annotation result plus the source text it was computed from.
///
/// `source_text` equals the message text at the time the record was produced;
/// a mismatch with the current text is the sole signal that an edit should
/// trigger regeneration. Persisted as `{ "message": ..., "feedback": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Message text the feedback was generated for.
    #[serde(rename = "message")]
    pub source_text: String,
    /// Generated feedback text.
    #[serde(rename = "feedback")]
    pub feedback_text: String,
}

/// Lifecycle events delivered by the host, as a typed enum rather than
/// string event names. Identifier-carrying variants reference a message by
/// its ordinal in the chat sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostEvent {
    /// A message finished rendering (covers newly sent messages).
    MessageRendered(MessageId),
    /// A message's text was edited in place.
    MessageEdited(MessageId),
    /// A different conversation was loaded.
    ChatChanged,
    /// The user clicked the request-feedback control on one message.
    FeedbackRequested(MessageId),
    /// The user clicked the delete-feedback control on one message.
    FeedbackDeleted(MessageId),
    /// The user asked to clear feedback from the whole conversation.
    FeedbackPurged,
}
