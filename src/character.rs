use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// The structured description of a character, as derived from sample text.
// Every field is required on the wire: a partial analysis never becomes a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    pub personality: String,
    pub language_style: String,
    #[serde(deserialize_with = "facts_as_text")]
    pub long_term_memory: IndexMap<String, String>,
}

// Fact values arrive as any JSON scalar (`"age": 17`); they are kept as text.
fn facts_as_text<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let facts = IndexMap::<String, Value>::deserialize(deserializer)?;
    Ok(facts
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(text) => (key, text),
            other => (key, other.to_string()),
        })
        .collect())
}

impl CharacterProfile {
    pub fn new(personality: impl Into<String>, language_style: impl Into<String>) -> Self {
        CharacterProfile {
            personality: personality.into(),
            language_style: language_style.into(),
            long_term_memory: IndexMap::new(),
        }
    }

    pub fn with_memory(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_memory(key, value);
        self
    }

    /// Parses the oracle's analysis JSON. Missing fields are an error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn set_personality(&mut self, personality: impl Into<String>) {
        self.personality = personality.into();
    }

    pub fn set_language_style(&mut self, language_style: impl Into<String>) {
        self.language_style = language_style.into();
    }

    // Overwrites the value in place when the key exists, so display order is kept.
    pub fn set_memory(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.long_term_memory.insert(key.into(), value.into());
    }

    pub fn memory_facts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.long_term_memory
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
