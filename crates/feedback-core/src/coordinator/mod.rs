//! Feedback lifecycle coordinator: reacts to host events, drives the
//! generation port, and keeps each message's annotation and stored record in
//! step.

mod ports;

pub use ports::{AnnotationView, ChatAccess, GenerationClient, GenerationError};

use crate::prompt::build_prompt;
use crate::settings::SettingsController;
use crate::shared::{FeedbackRecord, HostEvent, MessageId};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Coordinates the per-message feedback lifecycle
/// (absent → pending → present) over the injected host ports.
pub struct FeedbackCoordinator {
    settings: Arc<SettingsController>,
    chat: Arc<dyn ChatAccess>,
    view: Arc<dyn AnnotationView>,
    generator: Arc<dyn GenerationClient>,
    /// Messages with a generation call in flight. Requests for one message are
    /// not serialized: concurrent regenerations race and the later resolution
    /// overwrites the earlier record and annotation.
    pending: RwLock<HashSet<MessageId>>,
}

impl FeedbackCoordinator {
    pub fn new(
        settings: Arc<SettingsController>,
        chat: Arc<dyn ChatAccess>,
        view: Arc<dyn AnnotationView>,
        generator: Arc<dyn GenerationClient>,
    ) -> Self {
        Self {
            settings,
            chat,
            view,
            generator,
            pending: RwLock::new(HashSet::new()),
        }
    }

    /// Whether a generation call is currently in flight for a message.
    pub fn is_pending(&self, id: MessageId) -> bool {
        self.pending.read().map(|p| p.contains(&id)).unwrap_or(false)
    }

    /// Single entry point for host events; routes to one method per kind.
    pub async fn dispatch(&self, event: HostEvent) -> Result<(), GenerationError> {
        tracing::debug!(target: "feedback::coordinator", ?event, "host event");
        match event {
            HostEvent::MessageRendered(id) => self.on_message_rendered(id).await,
            HostEvent::MessageEdited(id) => self.on_message_edited(id).await,
            HostEvent::ChatChanged => {
                self.on_chat_changed();
                Ok(())
            }
            HostEvent::FeedbackRequested(id) => self.on_feedback_requested(id).await,
            HostEvent::FeedbackDeleted(id) => {
                self.on_feedback_deleted(id);
                Ok(())
            }
            HostEvent::FeedbackPurged => {
                self.on_feedback_purged();
                Ok(())
            }
        }
    }

    /// A message finished rendering: attach the controls and, when configured,
    /// generate feedback for new user messages right away.
    pub async fn on_message_rendered(&self, id: MessageId) -> Result<(), GenerationError> {
        let settings = self.settings.snapshot();
        if !settings.enabled {
            return Ok(());
        }
        let Some(message) = self.chat.message(id) else {
            tracing::warn!(target: "feedback::coordinator", id, "rendered message not found");
            return Ok(());
        };
        self.view.attach_controls(id);
        if settings.auto_on_new_message && message.is_user {
            self.regenerate(id).await?;
        }
        Ok(())
    }

    /// A message was edited: regenerate only when auto-on-edit is set and the
    /// stored record has gone stale against the current text.
    pub async fn on_message_edited(&self, id: MessageId) -> Result<(), GenerationError> {
        let settings = self.settings.snapshot();
        if !settings.enabled || !settings.auto_on_edit {
            return Ok(());
        }
        let Some(message) = self.chat.message(id) else {
            return Ok(());
        };
        if message.feedback_is_stale() {
            self.regenerate(id).await?;
        }
        Ok(())
    }

    /// A different conversation was loaded: attach controls to user messages
    /// (when enabled) and render every stored record without generating.
    pub fn on_chat_changed(&self) {
        let settings = self.settings.snapshot();
        for id in self.chat.message_ids() {
            let Some(message) = self.chat.message(id) else {
                continue;
            };
            if settings.enabled && message.is_user {
                self.view.attach_controls(id);
            }
            if let Some(record) = message.feedback() {
                self.view
                    .attach_annotation(id, &record.feedback_text, settings.collapsed_by_default);
            }
        }
    }

    /// Explicit user request for one message.
    pub async fn on_feedback_requested(&self, id: MessageId) -> Result<(), GenerationError> {
        self.regenerate(id).await
    }

    /// Explicit user delete for one message.
    pub fn on_feedback_deleted(&self, id: MessageId) {
        if self.chat.set_feedback(id, None) {
            self.view.clear_annotation(id);
            self.chat.request_save();
        }
    }

    /// Clears every record in the current conversation. Aborts with a
    /// user-visible notification when no chat is loaded.
    pub fn on_feedback_purged(&self) {
        if !self.chat.is_loaded() {
            self.view.notify("No chat loaded; nothing to purge.");
            return;
        }
        let mut cleared = 0usize;
        for id in self.chat.message_ids() {
            if self.chat.set_feedback(id, None) {
                self.view.clear_annotation(id);
                cleared += 1;
            }
        }
        tracing::info!(target: "feedback::coordinator", cleared, "feedback purged");
        self.chat.request_save();
    }

    /// Absent/Present → Pending → Present. Builds the prompt from the
    /// configured window, awaits the generation port, and writes the new
    /// record. The pending marker is cleared on both the success and the
    /// failure path; on failure the annotation is removed and the error
    /// propagated.
    async fn regenerate(&self, id: MessageId) -> Result<(), GenerationError> {
        let Some(target) = self.chat.message(id) else {
            tracing::warn!(target: "feedback::coordinator", id, "message not found, skipping");
            return Ok(());
        };
        let settings = self.settings.snapshot();
        let window = settings.previous_message_window;
        let preceding = self.chat.preceding(id, window);
        let prompt = build_prompt(
            &target,
            &preceding,
            window,
            &settings.prompt_template,
            &settings.instruction_text,
        );

        if let Ok(mut pending) = self.pending.write() {
            pending.insert(id);
        }
        self.view.show_pending(id);

        let outcome = self.generator.generate(&prompt).await;

        if let Ok(mut pending) = self.pending.write() {
            pending.remove(&id);
        }

        match outcome {
            Ok(feedback_text) => {
                let record = FeedbackRecord {
                    source_text: target.text,
                    feedback_text,
                };
                self.chat.set_feedback(id, Some(record.clone()));
                self.view
                    .attach_annotation(id, &record.feedback_text, settings.collapsed_by_default);
                self.chat.request_save();
                tracing::debug!(target: "feedback::coordinator", id, "feedback stored");
                Ok(())
            }
            Err(err) => {
                self.view.clear_annotation(id);
                tracing::warn!(target: "feedback::coordinator", id, %err, "generation failed");
                Err(err)
            }
        }
    }
}
