//! feedback-core: input-feedback coordinator for a chat host.
//!
//! The host delivers lifecycle events ([`HostEvent`]), owns the conversation
//! and settings persistence, and exposes one opaque text-generation call. This
//! crate builds the bounded-window prompt, drives the per-message feedback
//! lifecycle, and talks to the host only through the ports in
//! [`coordinator`].

mod coordinator;
mod host;
mod prompt;
mod settings;
mod shared;

pub use coordinator::{
    AnnotationView, ChatAccess, FeedbackCoordinator, GenerationClient, GenerationError,
};

pub use host::InMemoryChat;

pub use prompt::{
    build_prompt, PLACEHOLDER_INSTRUCTION, PLACEHOLDER_MESSAGE, PLACEHOLDER_PREVIOUS_MESSAGES,
};

pub use settings::{
    FeedbackSettings, PersistFn, SettingChange, SettingsController, MAX_PREVIOUS_MESSAGE_WINDOW,
};

pub use shared::{ChatMessage, FeedbackRecord, HostEvent, MessageId, FEEDBACK_EXTRA_KEY};
