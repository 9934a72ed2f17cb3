//! Model parameters carried by a mask.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model parameters embedded in every mask.
///
/// Missing fields in persisted data fall back to the defaults below.
/// Parameters this build does not know about are kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling mass.
    pub top_p: f64,
    /// Completion token limit.
    pub max_tokens: u32,
    /// Presence penalty.
    pub presence_penalty: f64,
    /// Frequency penalty.
    pub frequency_penalty: f64,
    /// Whether the running summary is sent with each request.
    #[serde(rename = "sendMemory")]
    pub send_memory: bool,
    /// How many history messages are attached to a request.
    #[serde(rename = "historyMessageCount")]
    pub history_message_count: u32,
    /// History length (characters) that triggers compression.
    #[serde(rename = "compressMessageLengthThreshold")]
    pub compress_message_length_threshold: u32,
    /// Whether the host injects its system prompt.
    #[serde(rename = "enableInjectSystemPrompts")]
    pub enable_inject_system_prompts: bool,
    /// Input template.
    pub template: String,
    /// Unknown parameters, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.5,
            top_p: 1.0,
            max_tokens: 4000,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            send_memory: true,
            history_message_count: 4,
            compress_message_length_threshold: 1000,
            enable_inject_system_prompts: true,
            template: "{{input}}".to_string(),
            extra: Map::new(),
        }
    }
}

/// A partial [`ModelConfig`], as carried by built-in masks.
///
/// Every field is optional. [`ModelConfigOverrides::apply_to`] lays the
/// overrides over a base config field by field: a set field wins, an unset
/// one falls through to the base. The merge is shallow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfigOverrides {
    /// Model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling mass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Completion token limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Presence penalty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Frequency penalty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Whether the running summary is sent with each request.
    #[serde(
        default,
        rename = "sendMemory",
        skip_serializing_if = "Option::is_none"
    )]
    pub send_memory: Option<bool>,
    /// How many history messages are attached to a request.
    #[serde(
        default,
        rename = "historyMessageCount",
        skip_serializing_if = "Option::is_none"
    )]
    pub history_message_count: Option<u32>,
    /// History length (characters) that triggers compression.
    #[serde(
        default,
        rename = "compressMessageLengthThreshold",
        skip_serializing_if = "Option::is_none"
    )]
    pub compress_message_length_threshold: Option<u32>,
    /// Whether the host injects its system prompt.
    #[serde(
        default,
        rename = "enableInjectSystemPrompts",
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_inject_system_prompts: Option<bool>,
    /// Input template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Unknown parameters; these also win over the base.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelConfigOverrides {
    /// Returns true if no field is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Lays these overrides over `base`.
    #[must_use]
    pub fn apply_to(&self, base: &ModelConfig) -> ModelConfig {
        let mut extra = base.extra.clone();
        extra.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        ModelConfig {
            model: self.model.clone().unwrap_or_else(|| base.model.clone()),
            temperature: self.temperature.unwrap_or(base.temperature),
            top_p: self.top_p.unwrap_or(base.top_p),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            presence_penalty: self.presence_penalty.unwrap_or(base.presence_penalty),
            frequency_penalty: self.frequency_penalty.unwrap_or(base.frequency_penalty),
            send_memory: self.send_memory.unwrap_or(base.send_memory),
            history_message_count: self
                .history_message_count
                .unwrap_or(base.history_message_count),
            compress_message_length_threshold: self
                .compress_message_length_threshold
                .unwrap_or(base.compress_message_length_threshold),
            enable_inject_system_prompts: self
                .enable_inject_system_prompts
                .unwrap_or(base.enable_inject_system_prompts),
            template: self
                .template
                .clone()
                .unwrap_or_else(|| base.template.clone()),
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_take_defaults() {
        let config: ModelConfig = serde_json::from_value(json!({ "temperature": 1.2 })).unwrap();
        assert_eq!(config.temperature, 1.2);
        assert_eq!(config.top_p, 1.0);
        assert_eq!(config.model, ModelConfig::default().model);
        assert!(config.extra.is_empty());
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let input = json!({
            "model": "gpt-4",
            "temperature": 0.7,
            "providerName": "OpenAI",
            "compressModel": "gpt-4o-mini"
        });
        let config: ModelConfig = serde_json::from_value(input).unwrap();
        assert_eq!(config.extra.get("providerName"), Some(&json!("OpenAI")));

        let output = serde_json::to_value(&config).unwrap();
        assert_eq!(output["providerName"], json!("OpenAI"));
        assert_eq!(output["compressModel"], json!("gpt-4o-mini"));
        assert_eq!(output["sendMemory"], json!(true));
    }

    #[test]
    fn overrides_win_and_unset_fields_fall_through() {
        let base = ModelConfig {
            temperature: 0.5,
            top_p: 1.0,
            ..ModelConfig::default()
        };
        let overrides = ModelConfigOverrides {
            temperature: Some(0.9),
            ..ModelConfigOverrides::default()
        };

        let merged = overrides.apply_to(&base);
        assert_eq!(merged.temperature, 0.9);
        assert_eq!(merged.top_p, 1.0);
        assert_eq!(merged.model, base.model);
    }

    #[test]
    fn overrides_merge_is_shallow_for_extra() {
        let mut base = ModelConfig::default();
        base.extra.insert("providerName".into(), json!("OpenAI"));
        base.extra.insert("style".into(), json!({ "a": 1, "b": 2 }));

        let mut overrides = ModelConfigOverrides::default();
        overrides.extra.insert("style".into(), json!({ "a": 9 }));

        let merged = overrides.apply_to(&base);
        assert_eq!(merged.extra["providerName"], json!("OpenAI"));
        assert_eq!(merged.extra["style"], json!({ "a": 9 }));
    }

    #[test]
    fn empty_overrides() {
        assert!(ModelConfigOverrides::default().is_empty());
        let base = ModelConfig::default();
        assert_eq!(ModelConfigOverrides::default().apply_to(&base), base);

        let parsed: ModelConfigOverrides = serde_json::from_value(json!({ "max_tokens": 2000 })).unwrap();
        assert!(!parsed.is_empty());
        assert_eq!(parsed.max_tokens, Some(2000));
    }
}
