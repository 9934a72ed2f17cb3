//! Mask records and their seed conversation.

use super::{MaskId, ModelConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Avatar used when a mask is created without one.
pub const DEFAULT_MASK_AVATAR: &str = "1f513";

/// Name used when a mask is created without one.
pub const DEFAULT_MASK_NAME: &str = "New Conversation";

/// Plugin enabled on new masks.
pub const ARTIFACTS_PLUGIN: &str = "artifacts";

const SEED_KNOWLEDGE: &str = "These are the data knowledge you need to remember and understand：“In victoria, reasons for poorer \
water quality in lowland agriculture and urban areas:Higher electrical conductivity (EC): EC \
reflects the salinity of the water, and higher EC in water from lowland agricultural and urban \
areas indicates higher salt content in the water. This is usually closely related to irrigated \
agriculture, urban drainage and land use. In these regions, agricultural activities often lead to \
increased groundwater recharge, and salts in the groundwater enter the streams, increasing the \
conductivity. In addition, wastewater and runoff from urban areas can increase the salt content of \
water.Higher Turbidity: Turbidity is the concentration of suspended particulate matter in water, \
and higher turbidity is usually associated with land erosion, agricultural activities (e.g., soil \
tilling and crop cultivation), urban construction work, and poor ground cover. These activities \
result in soil and sediment entering the water body more readily, thereby increasing water \
turbidity.Low Dissolved Oxygen (DO): Low DO levels indicate that there is not enough oxygen in the \
water body, which can lead to the death of fish and other aquatic organisms. The main reason for \
lower DO in lowland areas is that there is more organic matter and pollutants in the water, \
resulting in increased oxygen consumption by microorganisms, especially during warm weather \
conditions. In addition, areas with slower water flow rates do not favor the entry of oxygen from \
the air into the water column, further reducing dissolved oxygen levels.Reasons for better water \
quality in mountainous forested areas:Lower Electrical Conductivity (EC): Mountain forest regions \
have better natural vegetation cover, less land erosion, and slower groundwater flow, resulting in \
lower salt levels in the water. These areas are usually located at high altitudes, are less \
disturbed by human activities, and have good permeability of the soil, which reduces the \
accumulation of salts.Lower turbidity: Because of the dense forest vegetation in mountainous areas, \
surface runoff is filtered by vegetation and soil, and less sediment and suspended matter enters \
the river, resulting in clearer water with lower turbidity.Dissolved Oxygen (DO) is high: Water \
flows in mountainous areas are usually more rapid, which aids in the exchange of oxygen with the \
water column. In addition, due to the cooler water temperatures, colder water is able to dissolve \
more oxygen, thus maintaining higher DO levels.”I'm going to ask you some questions about water \
quality in the state of vitoria, Australia based on this knowledge.";

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt.
    System,
    /// End user.
    User,
    /// Model reply.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        })
    }
}

/// One turn of a mask's seed conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Turn identifier.
    #[serde(default)]
    pub id: String,
    /// Who spoke.
    pub role: Role,
    /// Message text.
    #[serde(default)]
    pub content: String,
    /// Display timestamp; empty when unset.
    #[serde(default)]
    pub date: String,
    /// Whether the turn was still streaming when captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
    /// Whether the turn is an error placeholder.
    #[serde(default, rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    /// Model that produced the turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatMessage {
    /// Creates a turn with an empty date.
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            date: String::new(),
            streaming: None,
            is_error: None,
            model: None,
        }
    }
}

/// Returns the seed conversation new masks start with.
#[must_use]
pub fn default_context() -> Vec<ChatMessage> {
    vec![
        ChatMessage::new("jb-0", Role::User, SEED_KNOWLEDGE),
        ChatMessage::new("jb-1", Role::Assistant, "ChatGPT OK"),
    ]
}

/// A locale tag such as `en` or `cn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(String);

impl Lang {
    /// Wraps a locale tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Lang {
    fn default() -> Self {
        Self::new("en")
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Lang {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

fn default_avatar() -> String {
    DEFAULT_MASK_AVATAR.to_string()
}

fn default_name() -> String {
    DEFAULT_MASK_NAME.to_string()
}

/// A named, user-visible configuration bundle.
///
/// Fields missing from persisted data take their defaults; fields this
/// build does not know are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    /// Unique identifier.
    pub id: MaskId,
    /// Creation time, epoch milliseconds.
    #[serde(rename = "createdAt", default)]
    pub created_at: u64,
    /// Avatar reference (emoji code point).
    #[serde(default = "default_avatar")]
    pub avatar: String,
    /// Display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Hide the seed conversation from the user.
    #[serde(
        rename = "hideContext",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hide_context: Option<bool>,
    /// Seed conversation used to prime a new session.
    #[serde(default)]
    pub context: Vec<ChatMessage>,
    /// Track the global default config instead of `model_config`.
    #[serde(
        rename = "syncGlobalConfig",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sync_global_config: Option<bool>,
    /// Model parameters.
    #[serde(rename = "modelConfig", default)]
    pub model_config: ModelConfig,
    /// Locale tag.
    #[serde(default)]
    pub lang: Lang,
    /// Supplied by the host catalog; never persisted.
    #[serde(default)]
    pub builtin: bool,
    /// Enabled plugin identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<Vec<String>>,
    /// Unknown fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Mask {
    /// Returns true if the seed conversation should be hidden.
    #[must_use]
    pub fn hides_context(&self) -> bool {
        self.hide_context.unwrap_or(false)
    }

    /// Returns true if the mask tracks the global default config.
    #[must_use]
    pub fn syncs_global_config(&self) -> bool {
        self.sync_global_config.unwrap_or(false)
    }

    /// Returns true if `needle` (already lowercased) occurs in the name, or
    /// in any seed turn when `include_context` is set.
    pub(crate) fn matches(&self, needle: &str, include_context: bool) -> bool {
        if self.name.to_lowercase().contains(needle) {
            return true;
        }
        include_context
            && self
                .context
                .iter()
                .any(|m| m.content.to_lowercase().contains(needle))
    }
}

/// Caller-supplied fields for [`crate::MaskStore::create`].
///
/// Every set field overrides the default mask. There is no `id` or
/// `builtin`: the store always assigns those itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskDraft {
    /// Creation time override.
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    /// Avatar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Hide the seed conversation.
    #[serde(rename = "hideContext", skip_serializing_if = "Option::is_none")]
    pub hide_context: Option<bool>,
    /// Seed conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<ChatMessage>>,
    /// Track the global default config.
    #[serde(rename = "syncGlobalConfig", skip_serializing_if = "Option::is_none")]
    pub sync_global_config: Option<bool>,
    /// Model parameters.
    #[serde(rename = "modelConfig", skip_serializing_if = "Option::is_none")]
    pub model_config: Option<ModelConfig>,
    /// Locale tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<Lang>,
    /// Enabled plugins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<Vec<String>>,
}

impl MaskDraft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the avatar.
    #[must_use]
    pub fn avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Sets the creation time.
    #[must_use]
    pub fn created_at(mut self, created_at: u64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the seed conversation.
    #[must_use]
    pub fn context(mut self, context: Vec<ChatMessage>) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets the model parameters.
    #[must_use]
    pub fn model_config(mut self, config: ModelConfig) -> Self {
        self.model_config = Some(config);
        self
    }

    /// Sets the locale tag.
    #[must_use]
    pub fn lang(mut self, lang: impl Into<Lang>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Sets whether the seed conversation is hidden.
    #[must_use]
    pub fn hide_context(mut self, hide: bool) -> Self {
        self.hide_context = Some(hide);
        self
    }

    /// Sets whether the mask tracks the global config.
    #[must_use]
    pub fn sync_global_config(mut self, sync: bool) -> Self {
        self.sync_global_config = Some(sync);
        self
    }

    /// Lays the draft over `base`, leaving `id` and `builtin` untouched.
    pub(crate) fn apply_to(self, base: &mut Mask) {
        if let Some(v) = self.created_at {
            base.created_at = v;
        }
        if let Some(v) = self.avatar {
            base.avatar = v;
        }
        if let Some(v) = self.name {
            base.name = v;
        }
        if self.hide_context.is_some() {
            base.hide_context = self.hide_context;
        }
        if let Some(v) = self.context {
            base.context = v;
        }
        if self.sync_global_config.is_some() {
            base.sync_global_config = self.sync_global_config;
        }
        if let Some(v) = self.model_config {
            base.model_config = v;
        }
        if let Some(v) = self.lang {
            base.lang = v;
        }
        if self.plugin.is_some() {
            base.plugin = self.plugin;
        }
    }
}

impl From<Mask> for MaskDraft {
    /// Copies every field except `id` and `builtin`, e.g. to clone a
    /// built-in mask into a user mask.
    fn from(mask: Mask) -> Self {
        Self {
            created_at: Some(mask.created_at),
            avatar: Some(mask.avatar),
            name: Some(mask.name),
            hide_context: mask.hide_context,
            context: Some(mask.context),
            sync_global_config: mask.sync_global_config,
            model_config: Some(mask.model_config),
            lang: Some(mask.lang),
            plugin: mask.plugin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_context_is_user_then_assistant() {
        let ctx = default_context();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx[0].id, "jb-0");
        assert_eq!(ctx[0].role, Role::User);
        assert!(ctx[0].content.contains("water quality"));
        assert_eq!(ctx[1].role, Role::Assistant);
        assert_eq!(ctx[1].date, "");
    }

    #[test]
    fn seed_knowledge_keeps_exact_wording() {
        let content = &default_context()[0].content;
        assert!(content.starts_with(
            "These are the data knowledge you need to remember and understand：“In victoria, "
        ));
        assert!(content.contains("maintaining higher DO levels.”I'm going to ask"));
        assert!(content.ends_with("in the state of vitoria, Australia based on this knowledge."));
        assert!(content.contains("runoff from urban areas can increase the salt content of water.Higher Turbidity"));
        assert!(!content.contains('\n'));
    }

    #[test]
    fn sparse_mask_takes_defaults() {
        let mask: Mask = serde_json::from_value(json!({ "id": "m1" })).unwrap();
        assert_eq!(mask.id.as_str(), "m1");
        assert_eq!(mask.avatar, DEFAULT_MASK_AVATAR);
        assert_eq!(mask.name, DEFAULT_MASK_NAME);
        assert_eq!(mask.created_at, 0);
        assert!(!mask.builtin);
        assert!(mask.context.is_empty());
        assert_eq!(mask.lang, Lang::default());
    }

    #[test]
    fn camel_case_keys_and_unknown_fields() {
        let input = json!({
            "id": "m1",
            "createdAt": 42,
            "avatar": "1f916",
            "name": "Coder",
            "hideContext": true,
            "context": [{ "id": "c0", "role": "system", "content": "be terse", "date": "" }],
            "syncGlobalConfig": false,
            "modelConfig": { "model": "gpt-4", "temperature": 0.2 },
            "lang": "cn",
            "builtin": false,
            "plugin": ["artifacts"],
            "usePluginInfo": true
        });
        let mask: Mask = serde_json::from_value(input).unwrap();
        assert_eq!(mask.created_at, 42);
        assert!(mask.hides_context());
        assert!(!mask.syncs_global_config());
        assert_eq!(mask.context[0].role, Role::System);
        assert_eq!(mask.extra.get("usePluginInfo"), Some(&json!(true)));

        let out = serde_json::to_value(&mask).unwrap();
        assert_eq!(out["createdAt"], json!(42));
        assert_eq!(out["modelConfig"]["model"], json!("gpt-4"));
        assert_eq!(out["usePluginInfo"], json!(true));
    }

    #[test]
    fn matches_name_and_context_case_insensitively() {
        let mut mask: Mask = serde_json::from_value(json!({ "id": "m", "name": "Rust Tutor" })).unwrap();
        mask.context = vec![ChatMessage::new("c", Role::User, "Explain Borrowing")];

        assert!(mask.matches("tutor", false));
        assert!(mask.matches("borrowing", true));
        assert!(!mask.matches("borrowing", false));
        assert!(!mask.matches("python", true));
    }

    #[test]
    fn draft_from_mask_drops_identity() {
        let mask: Mask = serde_json::from_value(json!({
            "id": "builtin-1",
            "name": "Translator",
            "builtin": true
        }))
        .unwrap();
        let draft = MaskDraft::from(mask);
        assert_eq!(draft.name.as_deref(), Some("Translator"));

        let mut target: Mask = serde_json::from_value(json!({ "id": "fresh" })).unwrap();
        draft.apply_to(&mut target);
        assert_eq!(target.id.as_str(), "fresh");
        assert!(!target.builtin);
        assert_eq!(target.name, "Translator");
    }
}
