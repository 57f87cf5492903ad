// src/prompts.rs
use indexmap::IndexMap;

use crate::message::ChatMessage;

/// Asks for the three profile fields as a single JSON object.
pub fn analysis_prompt(source_text: &str) -> String {
    format!(
        r#"# Task: Character Analysis

You are an expert literary analyst. Read the text below, which shows a fictional character through narration, dialogue or quotes, and describe that character.

## Text

{source_text}

## Output Format

Return exactly one JSON object and nothing else, with these three keys:

```json
{{
  "personality": "<traits, values, motivations and typical behavior>",
  "languageStyle": "<speech patterns: tone, vocabulary, sentence endings, verbal tics, how they address others>",
  "longTermMemory": {{
    "<fact name>": "<fact value>"
  }}
}}
```

* `personality` and `languageStyle` are plain strings.
* `longTermMemory` maps short fact names (relationships, background, important events, preferences) to one-sentence values. Both keys and values are strings.
"#
    )
}

/// Stage 1: what the character would say, deliberately without their voice.
pub fn content_prompt(
    personality: &str,
    long_term_memory: &IndexMap<String, String>,
    history_text: &str,
    user_message: &str,
) -> String {
    let memory = render_memory(long_term_memory);
    format!(
        r#"# Task: Reply Content

You decide what a character replies in a conversation. Only the content matters here: ignore their speech style and write in plain, neutral language.

## Personality

{personality}

## Long-Term Memory

{memory}

## Conversation So Far

{history_text}

## Latest User Message

{user_message}

## Output Format

Return only the content of the character's reply to the latest user message, consistent with their personality and memory. No speaker label, no commentary.
"#
    )
}

/// Stage 2: restyle the stage 1 content without changing what it says.
pub fn style_prompt(language_style: &str, content_text: &str) -> String {
    format!(
        r#"# Task: Apply Speech Style

Rewrite the text below so that it sounds exactly like a character with the following speech style. Keep the meaning intact: do not add or remove information.

## Speech Style

{language_style}

## Text

{content_text}

## Output Format

Return only the rewritten text.
"#
    )
}

/// Renders the conversational part of a transcript as `role: content` lines.
pub fn render_history(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter(|message| message.role.is_conversational())
        .map(|message| format!("{}: {}", message.role, message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_memory(long_term_memory: &IndexMap<String, String>) -> String {
    if long_term_memory.is_empty() {
        return "(none)".to_string();
    }
    long_term_memory
        .iter()
        .map(|(key, value)| format!("- {key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
