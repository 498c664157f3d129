//! Console host for the feedback coordinator.
//!
//! Wires the coordinator to an in-memory chat, a mock generation client, and a
//! console annotation view, then drives a scripted conversation through the
//! host event dispatch. Useful as a living integration example and for
//! eyeballing prompt and lifecycle behavior without a real chat host.

use feedback_core::{
    AnnotationView, ChatAccess, ChatMessage, FeedbackCoordinator, FeedbackSettings,
    GenerationClient, GenerationError, HostEvent, InMemoryChat, MessageId, SettingChange,
    SettingsController,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Mock generation client: deterministic "feedback" derived from the prompt,
/// so runs are reproducible without an LLM backend.
struct MockGenerator;

#[async_trait::async_trait]
impl GenerationClient for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let preview: String = prompt.chars().take(60).collect();
        tracing::debug!(target: "feedback::console", prompt_len = prompt.len(), "mock generate");
        Ok(format!(
            "[Mock feedback] The wording is understandable. (prompt started: {preview}…)"
        ))
    }
}

/// Annotation view that renders to the log instead of a DOM.
struct ConsoleView;

impl AnnotationView for ConsoleView {
    fn attach_controls(&self, id: MessageId) {
        tracing::info!(target: "feedback::console", id, "controls attached");
    }

    fn show_pending(&self, id: MessageId) {
        tracing::info!(target: "feedback::console", id, "generating…");
    }

    fn attach_annotation(&self, id: MessageId, feedback: &str, folded: bool) {
        tracing::info!(target: "feedback::console", id, folded, "annotation: {feedback}");
    }

    fn clear_annotation(&self, id: MessageId) {
        tracing::info!(target: "feedback::console", id, "annotation cleared");
    }

    fn notify(&self, text: &str) {
        tracing::info!(target: "feedback::console", "notice: {text}");
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[feedback-console] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = match FeedbackSettings::load() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("settings load failed, using defaults: {e}");
            FeedbackSettings::default()
        }
    };
    let controller = Arc::new(SettingsController::new(
        settings,
        Box::new(|s| {
            tracing::debug!(
                target: "feedback::console",
                enabled = s.enabled,
                window = s.previous_message_window,
                "settings persisted"
            );
        }),
    ));

    let chat = Arc::new(InMemoryChat::new());
    let coordinator = FeedbackCoordinator::new(
        Arc::clone(&controller),
        Arc::clone(&chat) as Arc<dyn ChatAccess>,
        Arc::new(ConsoleView) as Arc<dyn AnnotationView>,
        Arc::new(MockGenerator) as Arc<dyn GenerationClient>,
    );

    // Scripted conversation: load a chat, render messages, request feedback,
    // edit a message, then purge.
    chat.load(vec![
        ChatMessage::new("Seren", false, "Hello! What brings you here today?"),
        ChatMessage::new("You", true, "i has a question about the weather"),
    ]);
    dispatch(&coordinator, HostEvent::ChatChanged).await;
    dispatch(&coordinator, HostEvent::MessageRendered(1)).await;

    dispatch(&coordinator, HostEvent::FeedbackRequested(1)).await;

    // Turn on auto modes through the settings panel path.
    controller.apply(SettingChange::AutoOnNewMessage(true));
    let id = chat.push(ChatMessage::new("You", true, "and also, whats you favorite season"));
    dispatch(&coordinator, HostEvent::MessageRendered(id)).await;

    chat.edit(id, "And also, what's your favorite season?");
    dispatch(&coordinator, HostEvent::MessageEdited(id)).await;

    dispatch(&coordinator, HostEvent::FeedbackDeleted(1)).await;
    dispatch(&coordinator, HostEvent::FeedbackPurged).await;

    tracing::info!(
        target: "feedback::console",
        saves = chat.save_requests(),
        "scripted conversation finished"
    );
}

async fn dispatch(coordinator: &FeedbackCoordinator, event: HostEvent) {
    if let Err(e) = coordinator.dispatch(event).await {
        tracing::warn!(target: "feedback::console", "event handling failed: {e}");
    }
}
