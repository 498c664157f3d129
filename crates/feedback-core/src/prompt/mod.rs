//! Prompt assembly for feedback generation.
//!
//! A prompt is a template with three placeholders: the bounded window of
//! preceding turns, the target message text, and the instruction. Substitution
//! is literal, case-insensitive, and first-occurrence-only per placeholder; a
//! template without a given placeholder simply drops that slot's content.

use crate::shared::ChatMessage;

/// Placeholder for the preceding-turns block.
pub const PLACEHOLDER_PREVIOUS_MESSAGES: &str = "{{previousMessages}}";
/// Placeholder for the target message's text.
pub const PLACEHOLDER_MESSAGE: &str = "{{message}}";
/// Placeholder for the fixed instruction text.
pub const PLACEHOLDER_INSTRUCTION: &str = "{{prompt}}";

/// Block rendered when the window is zero or no preceding turn is available.
const EMPTY_WINDOW_BLOCK: &str = "None";

/// Builds the generation prompt for one target message.
///
/// Selects the up-to-`window` turns immediately preceding the target (the
/// tail of `preceding`), renders them oldest first as `"<name>: <text>"`
/// joined by blank lines, and substitutes the block, the target text, and the
/// instruction into `template`. Pure: no I/O, deterministic for given inputs.
pub fn build_prompt(
    target: &ChatMessage,
    preceding: &[ChatMessage],
    window: usize,
    template: &str,
    instruction: &str,
) -> String {
    let block = render_window(preceding, window);
    let out = replace_first_ignore_case(template, PLACEHOLDER_PREVIOUS_MESSAGES, &block);
    let out = replace_first_ignore_case(&out, PLACEHOLDER_MESSAGE, &target.text);
    replace_first_ignore_case(&out, PLACEHOLDER_INSTRUCTION, instruction)
}

/// Renders the last `window` entries of `preceding` as the history block.
fn render_window(preceding: &[ChatMessage], window: usize) -> String {
    if window == 0 || preceding.is_empty() {
        return EMPTY_WINDOW_BLOCK.to_string();
    }
    let start = preceding.len().saturating_sub(window);
    preceding[start..]
        .iter()
        .map(|m| format!("{}: {}", m.name, m.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Replaces the first occurrence of `pattern` in `haystack`, ignoring ASCII
/// case. Placeholders are fixed ASCII tokens, so ASCII folding is sufficient.
fn replace_first_ignore_case(haystack: &str, pattern: &str, replacement: &str) -> String {
    match find_ignore_ascii_case(haystack, pattern) {
        Some(at) => {
            let mut out = String::with_capacity(haystack.len() + replacement.len());
            out.push_str(&haystack[..at]);
            out.push_str(replacement);
            out.push_str(&haystack[at + pattern.len()..]);
            out
        }
        None => haystack.to_string(),
    }
}

fn find_ignore_ascii_case(haystack: &str, pattern: &str) -> Option<usize> {
    if pattern.is_empty() || pattern.len() > haystack.len() {
        return None;
    }
    let bytes = haystack.as_bytes();
    let pat = pattern.as_bytes();
    (0..=bytes.len() - pat.len()).find(|&i| bytes[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(name: &str, is_user: bool, text: &str) -> ChatMessage {
        ChatMessage::new(name, is_user, text)
    }

    #[test]
    fn builds_documented_scenario() {
        let preceding = vec![turn("Alice", false, "Hi")];
        let target = turn("Bob", true, "How r u");
        let prompt = build_prompt(
            &target,
            &preceding,
            1,
            "Prev:\n{{previousMessages}}\nMsg:\n{{message}}\n{{prompt}}",
            "Fix grammar.",
        );
        assert_eq!(prompt, "Prev:\nAlice: Hi\nMsg:\nHow r u\nFix grammar.");
    }

    #[test]
    fn window_larger_than_history_uses_all_without_padding() {
        let preceding = vec![turn("Alice", false, "Hi")];
        let target = turn("Bob", true, "ok");
        let prompt = build_prompt(&target, &preceding, 5, "{{previousMessages}}", "x");
        assert_eq!(prompt, "Alice: Hi");
    }

    #[test]
    fn window_zero_renders_none() {
        let preceding = vec![turn("Alice", false, "Hi"), turn("Bob", true, "Hey")];
        let target = turn("Bob", true, "ok");
        let prompt = build_prompt(&target, &preceding, 0, "{{previousMessages}}", "x");
        assert_eq!(prompt, "None");
    }

    #[test]
    fn empty_history_renders_none() {
        let target = turn("Bob", true, "ok");
        let prompt = build_prompt(&target, &[], 3, "{{previousMessages}}", "x");
        assert_eq!(prompt, "None");
    }

    #[test]
    fn selects_most_recent_turns_oldest_first() {
        let preceding = vec![
            turn("Alice", false, "one"),
            turn("Bob", true, "two"),
            turn("Alice", false, "three"),
        ];
        let target = turn("Bob", true, "ok");
        let prompt = build_prompt(&target, &preceding, 2, "{{previousMessages}}", "x");
        assert_eq!(prompt, "Bob: two\n\nAlice: three");
    }

    #[test]
    fn placeholders_match_case_insensitively() {
        let target = turn("Bob", true, "hello");
        let prompt = build_prompt(
            &target,
            &[],
            0,
            "{{PREVIOUSMESSAGES}} | {{Message}} | {{PROMPT}}",
            "instr",
        );
        assert_eq!(prompt, "None | hello | instr");
    }

    #[test]
    fn only_first_occurrence_is_substituted() {
        let target = turn("Bob", true, "hello");
        let prompt = build_prompt(&target, &[], 0, "{{message}} {{message}}", "x");
        assert_eq!(prompt, "hello {{message}}");
    }

    #[test]
    fn missing_placeholder_drops_slot_silently() {
        let target = turn("Bob", true, "hello");
        let prompt = build_prompt(&target, &[], 0, "no placeholders here", "instr");
        assert_eq!(prompt, "no placeholders here");
    }

    #[test]
    fn identical_inputs_yield_identical_output() {
        let preceding = vec![turn("Alice", false, "Hi")];
        let target = turn("Bob", true, "How r u");
        let template = "P: {{previousMessages}} M: {{message}} I: {{prompt}}";
        let a = build_prompt(&target, &preceding, 1, template, "Fix grammar.");
        let b = build_prompt(&target, &preceding, 1, template, "Fix grammar.");
        assert_eq!(a, b);
    }
}
