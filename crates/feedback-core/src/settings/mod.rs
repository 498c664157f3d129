//! Component settings: defaults, layered load, and the controller that binds
//! UI-control changes to an injected persist callback.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

/// Upper bound offered by the window-size control. Stored values are not
/// clamped; only the control itself enforces the range.
pub const MAX_PREVIOUS_MESSAGE_WINDOW: usize = 20;

const DEFAULT_PREVIOUS_MESSAGE_WINDOW: usize = 4;

const DEFAULT_PROMPT_TEMPLATE: &str = "\
You are reviewing one message from an ongoing conversation.

Previous messages:
{{previousMessages}}

Message to review:
{{message}}

{{prompt}}";

const DEFAULT_INSTRUCTION_TEXT: &str = "Give short, concrete feedback on the wording of \
this message. Point out grammar or clarity problems and suggest a better phrasing.";

fn default_enabled() -> bool {
    true
}

fn default_auto_on_edit() -> bool {
    true
}

fn default_collapsed_by_default() -> bool {
    true
}

fn default_prompt_template() -> String {
    DEFAULT_PROMPT_TEMPLATE.to_string()
}

fn default_instruction_text() -> String {
    DEFAULT_INSTRUCTION_TEXT.to_string()
}

fn default_previous_message_window() -> usize {
    DEFAULT_PREVIOUS_MESSAGE_WINDOW
}

/// All options of the feedback component. Every field carries a serde
/// default, so a partial stored object picks up defaults for keys added
/// after it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSettings {
    /// Master switch; when off, lifecycle events are ignored.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Generate feedback as soon as a new user message renders.
    #[serde(default)]
    pub auto_on_new_message: bool,
    /// Regenerate when an edited message's stored record has gone stale.
    #[serde(default = "default_auto_on_edit")]
    pub auto_on_edit: bool,
    /// Attach new annotations folded shut.
    #[serde(default = "default_collapsed_by_default")]
    pub collapsed_by_default: bool,
    /// Prompt template; see the `prompt` module for placeholder names.
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,
    /// Fixed instruction substituted into the template.
    #[serde(default = "default_instruction_text")]
    pub instruction_text: String,
    /// How many immediately preceding turns the prompt includes.
    #[serde(default = "default_previous_message_window")]
    pub previous_message_window: usize,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            auto_on_new_message: false,
            auto_on_edit: default_auto_on_edit(),
            collapsed_by_default: default_collapsed_by_default(),
            prompt_template: default_prompt_template(),
            instruction_text: default_instruction_text(),
            previous_message_window: default_previous_message_window(),
        }
    }
}

impl FeedbackSettings {
    /// Load settings from file and environment. Precedence: env
    /// `FEEDBACK_CONFIG` path > `config/feedback.toml` > defaults, with
    /// `FEEDBACK__*` environment variables layered on top.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("FEEDBACK_CONFIG").unwrap_or_else(|_| "config/feedback".to_string());
        let builder = config::Config::builder()
            .set_default("enabled", default_enabled())?
            .set_default("auto_on_new_message", false)?
            .set_default("auto_on_edit", default_auto_on_edit())?
            .set_default("collapsed_by_default", default_collapsed_by_default())?
            .set_default("prompt_template", default_prompt_template())?
            .set_default("instruction_text", default_instruction_text())?
            .set_default(
                "previous_message_window",
                default_previous_message_window() as i64,
            )?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("FEEDBACK").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}

/// One change coming from a settings-panel control, one variant per control.
/// The window-size control delivers its raw string value and is numerically
/// coerced on apply (parse failure coerces to 0, no bounds clamping).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SettingChange {
    Enabled(bool),
    AutoOnNewMessage(bool),
    AutoOnEdit(bool),
    CollapsedByDefault(bool),
    PromptTemplate(String),
    InstructionText(String),
    PreviousMessageWindow(String),
}

/// Callback invoked after every applied change; the host debounces actual
/// flushes, so this may fire more often than storage is written.
pub type PersistFn = dyn Fn(&FeedbackSettings) + Send + Sync;

/// Holds the live settings and pushes every mutation through the injected
/// persist callback.
pub struct SettingsController {
    settings: RwLock<FeedbackSettings>,
    persist: Box<PersistFn>,
}

impl SettingsController {
    pub fn new(initial: FeedbackSettings, persist: Box<PersistFn>) -> Self {
        Self {
            settings: RwLock::new(initial),
            persist,
        }
    }

    /// Controller with a no-op persist callback, for hosts that snapshot the
    /// settings themselves.
    pub fn detached(initial: FeedbackSettings) -> Self {
        Self::new(initial, Box::new(|_| {}))
    }

    /// Current settings by value.
    pub fn snapshot(&self) -> FeedbackSettings {
        self.settings
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Applies one control change and schedules a persist.
    pub fn apply(&self, change: SettingChange) {
        if let Ok(mut s) = self.settings.write() {
            match change {
                SettingChange::Enabled(v) => s.enabled = v,
                SettingChange::AutoOnNewMessage(v) => s.auto_on_new_message = v,
                SettingChange::AutoOnEdit(v) => s.auto_on_edit = v,
                SettingChange::CollapsedByDefault(v) => s.collapsed_by_default = v,
                SettingChange::PromptTemplate(v) => s.prompt_template = v,
                SettingChange::InstructionText(v) => s.instruction_text = v,
                SettingChange::PreviousMessageWindow(raw) => {
                    s.previous_message_window = raw.trim().parse().unwrap_or(0);
                }
            }
            tracing::debug!(target: "feedback::settings", "setting applied, scheduling persist");
            (self.persist)(&s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn defaults_are_within_control_bounds() {
        let s = FeedbackSettings::default();
        assert!(s.enabled);
        assert!(s.auto_on_edit);
        assert!(!s.auto_on_new_message);
        assert!(s.previous_message_window <= MAX_PREVIOUS_MESSAGE_WINDOW);
        assert!(s.prompt_template.contains("{{previousMessages}}"));
        assert!(s.prompt_template.contains("{{message}}"));
        assert!(s.prompt_template.contains("{{prompt}}"));
    }

    #[test]
    fn partial_stored_object_picks_up_new_defaults() {
        let s: FeedbackSettings = serde_json::from_str(r#"{ "enabled": false }"#).unwrap();
        assert!(!s.enabled);
        assert!(s.auto_on_edit);
        assert_eq!(s.prompt_template, FeedbackSettings::default().prompt_template);
        assert_eq!(s.previous_message_window, 4);
    }

    #[test]
    fn every_change_invokes_persist_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let controller = SettingsController::new(
            FeedbackSettings::default(),
            Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );
        controller.apply(SettingChange::Enabled(false));
        controller.apply(SettingChange::InstructionText("Be brief.".to_string()));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        let s = controller.snapshot();
        assert!(!s.enabled);
        assert_eq!(s.instruction_text, "Be brief.");
    }

    #[test]
    fn window_control_value_is_numerically_coerced() {
        let controller = SettingsController::detached(FeedbackSettings::default());
        controller.apply(SettingChange::PreviousMessageWindow(" 12 ".to_string()));
        assert_eq!(controller.snapshot().previous_message_window, 12);
        controller.apply(SettingChange::PreviousMessageWindow("garbage".to_string()));
        assert_eq!(controller.snapshot().previous_message_window, 0);
    }

    #[test]
    fn stored_window_is_not_clamped() {
        let controller = SettingsController::detached(FeedbackSettings::default());
        controller.apply(SettingChange::PreviousMessageWindow("99".to_string()));
        assert_eq!(controller.snapshot().previous_message_window, 99);
    }
}
