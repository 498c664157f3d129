//! In-process reference implementation of [`ChatAccess`].
//!
//! Real hosts adapt their own chat store to the port; this adapter backs the
//! crate's tests and the console add-on with a plain vector of messages.

use crate::coordinator::ChatAccess;
use crate::shared::{ChatMessage, FeedbackRecord, MessageId};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

/// Vector-backed chat with a loaded flag and a save-request counter.
pub struct InMemoryChat {
    messages: RwLock<Vec<ChatMessage>>,
    loaded: AtomicBool,
    save_requests: AtomicUsize,
}

impl InMemoryChat {
    /// An adapter with no conversation loaded.
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            loaded: AtomicBool::new(false),
            save_requests: AtomicUsize::new(0),
        }
    }

    /// An adapter with the given conversation already loaded.
    pub fn with_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages: RwLock::new(messages),
            loaded: AtomicBool::new(true),
            save_requests: AtomicUsize::new(0),
        }
    }

    /// Replaces the current conversation, as the host does on chat change.
    pub fn load(&self, messages: Vec<ChatMessage>) {
        if let Ok(mut chat) = self.messages.write() {
            *chat = messages;
            self.loaded.store(true, Ordering::SeqCst);
        }
    }

    /// Appends a message and returns its ordinal.
    pub fn push(&self, message: ChatMessage) -> MessageId {
        match self.messages.write() {
            Ok(mut chat) => {
                chat.push(message);
                self.loaded.store(true, Ordering::SeqCst);
                chat.len() - 1
            }
            Err(_) => 0,
        }
    }

    /// Rewrites a message's text in place, as the host's edit control does.
    /// Returns false when the message does not exist.
    pub fn edit(&self, id: MessageId, text: impl Into<String>) -> bool {
        if let Ok(mut chat) = self.messages.write() {
            if let Some(message) = chat.get_mut(id) {
                message.text = text.into();
                return true;
            }
        }
        false
    }

    /// How many debounced saves have been requested so far.
    pub fn save_requests(&self) -> usize {
        self.save_requests.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryChat {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatAccess for InMemoryChat {
    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn message(&self, id: MessageId) -> Option<ChatMessage> {
        self.messages.read().ok()?.get(id).cloned()
    }

    fn preceding(&self, id: MessageId, limit: usize) -> Vec<ChatMessage> {
        let Ok(chat) = self.messages.read() else {
            return Vec::new();
        };
        let end = id.min(chat.len());
        let start = end.saturating_sub(limit);
        chat[start..end].to_vec()
    }

    fn message_ids(&self) -> Vec<MessageId> {
        self.messages
            .read()
            .map(|chat| (0..chat.len()).collect())
            .unwrap_or_default()
    }

    fn set_feedback(&self, id: MessageId, record: Option<FeedbackRecord>) -> bool {
        if let Ok(mut chat) = self.messages.write() {
            if let Some(message) = chat.get_mut(id) {
                message.set_feedback(record);
                return true;
            }
        }
        false
    }

    fn request_save(&self) {
        self.save_requests.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(target: "feedback::host", "chat save requested");
    }
}
