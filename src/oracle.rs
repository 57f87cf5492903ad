use std::future::Future;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};

use crate::error::OracleError;
use crate::settings::Settings;

const FENCE: &str = "```";

/// A text completion service: one prompt in, one text out.
pub trait Oracle {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, OracleError>> + Send;
}

#[derive(Clone, Debug)]
pub struct OpenAIOracle {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIOracle {
    pub fn new(api_key: impl Into<String>, settings: &Settings) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(api_key.into());
        if let Some(api_base) = &settings.api_base {
            openai_config = openai_config.with_api_base(api_base);
        }
        Self {
            client: Client::with_config(openai_config),
            model: settings.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Oracle for OpenAIOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(user_message)])
            .build()?;

        log::debug!("Sending {} prompt chars to {}", prompt.len(), self.model);
        let response = self.client.chat().create(request).await?;

        // A completion without text is passed on as empty, not as a failure.
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        log::debug!("Received {} completion chars", text.len());
        Ok(text)
    }
}

/// Returns the body of a fenced code block wrapping the JSON, if there is one.
///
/// A bare JSON object is returned as is, even when its strings contain fences.
/// Otherwise only a block that opens the text, or one tagged `json` after some
/// prose, is unwrapped. Anything else comes back unchanged (trimmed).
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }

    let open = if trimmed.starts_with(FENCE) {
        Some(0)
    } else {
        trimmed
            .match_indices(FENCE)
            .map(|(index, _)| index)
            .find(|&index| fence_tag(&trimmed[index + FENCE.len()..]).eq_ignore_ascii_case("json"))
    };
    let Some(open) = open else {
        return trimmed;
    };

    let after_open = &trimmed[open + FENCE.len()..];
    let tag = fence_tag(after_open);
    let body = match after_open.split_once('\n') {
        Some((_, rest)) if tag.chars().all(|c| c.is_ascii_alphanumeric()) => rest,
        _ => after_open,
    };

    // The last fence closes the block, so fences quoted inside the JSON survive.
    match body.rfind(FENCE) {
        Some(close) => body[..close].trim(),
        None => trimmed,
    }
}

// The info string on a fence's opening line, e.g. `json`.
fn fence_tag(after_fence: &str) -> &str {
    after_fence.lines().next().unwrap_or_default().trim()
}
