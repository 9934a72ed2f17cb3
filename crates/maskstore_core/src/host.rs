//! Collaborators supplied by the embedding application.

use crate::error::{CoreError, CoreResult};
use crate::mask::{ChatMessage, Lang, Mask, MaskId, ModelConfig, ModelConfigOverrides};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Read-only view of the host's global settings.
///
/// The store consults these when it creates a mask and every time it
/// resolves the built-in catalog, so changes take effect immediately.
pub trait HostDefaults: Send + Sync {
    /// The global default model configuration.
    fn current_config(&self) -> ModelConfig;

    /// The active locale.
    fn current_locale(&self) -> Lang;

    /// Whether built-in masks are hidden from listings.
    fn hide_builtin_masks(&self) -> bool {
        false
    }
}

impl<T: HostDefaults + ?Sized> HostDefaults for Arc<T> {
    fn current_config(&self) -> ModelConfig {
        (**self).current_config()
    }

    fn current_locale(&self) -> Lang {
        (**self).current_locale()
    }

    fn hide_builtin_masks(&self) -> bool {
        (**self).hide_builtin_masks()
    }
}

/// Fixed host defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticDefaults {
    /// Global default model configuration.
    pub config: ModelConfig,
    /// Active locale.
    pub locale: Lang,
    /// Hide built-in masks.
    pub hide_builtin_masks: bool,
}

impl StaticDefaults {
    /// Creates defaults with the stock model config and English locale.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default model configuration.
    #[must_use]
    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the locale.
    #[must_use]
    pub fn locale(mut self, locale: impl Into<Lang>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Sets whether built-in masks are hidden.
    #[must_use]
    pub fn hide_builtins(mut self, hide: bool) -> Self {
        self.hide_builtin_masks = hide;
        self
    }
}

impl HostDefaults for StaticDefaults {
    fn current_config(&self) -> ModelConfig {
        self.config.clone()
    }

    fn current_locale(&self) -> Lang {
        self.locale.clone()
    }

    fn hide_builtin_masks(&self) -> bool {
        self.hide_builtin_masks
    }
}

/// A mask shipped with the host.
///
/// Unlike a user mask, its model config is partial; the rest is filled in
/// from the host's current defaults at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltinMask {
    /// Stable identifier.
    pub id: MaskId,
    /// Avatar reference.
    pub avatar: String,
    /// Display name.
    pub name: String,
    /// Creation time, epoch milliseconds.
    #[serde(rename = "createdAt", default)]
    pub created_at: u64,
    /// Hide the seed conversation.
    #[serde(rename = "hideContext", default, skip_serializing_if = "Option::is_none")]
    pub hide_context: Option<bool>,
    /// Seed conversation.
    #[serde(default)]
    pub context: Vec<ChatMessage>,
    /// Track the global default config.
    #[serde(
        rename = "syncGlobalConfig",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sync_global_config: Option<bool>,
    /// Partial model parameters.
    #[serde(rename = "modelConfig", default)]
    pub model_config: ModelConfigOverrides,
    /// Locale tag.
    #[serde(default)]
    pub lang: Lang,
    /// Enabled plugins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<Vec<String>>,
}

impl BuiltinMask {
    /// Produces the full mask, laying the overrides over `defaults`.
    #[must_use]
    pub fn resolve(&self, defaults: &ModelConfig) -> Mask {
        Mask {
            id: self.id.clone(),
            created_at: self.created_at,
            avatar: self.avatar.clone(),
            name: self.name.clone(),
            hide_context: self.hide_context,
            context: self.context.clone(),
            sync_global_config: self.sync_global_config,
            model_config: self.model_config.apply_to(defaults),
            lang: self.lang.clone(),
            builtin: true,
            plugin: self.plugin.clone(),
            extra: Map::new(),
        }
    }
}

/// Ordered, read-only list of built-in masks.
///
/// Cloning is cheap; clones share the list.
#[derive(Debug, Clone, Default)]
pub struct BuiltinCatalog {
    masks: Arc<[BuiltinMask]>,
}

impl BuiltinCatalog {
    /// Creates a catalog from `masks`, keeping their order.
    #[must_use]
    pub fn new(masks: Vec<BuiltinMask>) -> Self {
        Self {
            masks: masks.into(),
        }
    }

    /// Creates an empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a JSON array of built-in masks.
    ///
    /// # Errors
    ///
    /// Returns `CorruptState` if the document is not an array of masks.
    pub fn from_json(bytes: &[u8]) -> CoreResult<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        if !value.is_array() {
            return Err(CoreError::corrupt_state(
                "built-in catalog must be a JSON array",
            ));
        }
        let masks: Vec<BuiltinMask> = serde_json::from_value(value)
            .map_err(|e| CoreError::corrupt_state(format!("built-in catalog: {e}")))?;
        Ok(Self::new(masks))
    }

    /// Number of built-in masks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Iterates built-ins in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &BuiltinMask> {
        self.masks.iter()
    }

    /// Looks up a built-in by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BuiltinMask> {
        self.masks.iter().find(|m| m.id.as_str() == id)
    }

    /// Resolves every built-in against `defaults`.
    #[must_use]
    pub fn resolve_all(&self, defaults: &ModelConfig) -> Vec<Mask> {
        self.masks.iter().map(|m| m.resolve(defaults)).collect()
    }
}

impl From<Vec<BuiltinMask>> for BuiltinCatalog {
    fn from(masks: Vec<BuiltinMask>) -> Self {
        Self::new(masks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> BuiltinCatalog {
        BuiltinCatalog::from_json(
            json!([
                {
                    "id": "writer",
                    "avatar": "1f4dd",
                    "name": "Writer",
                    "createdAt": 1688899480511u64,
                    "context": [{ "id": "w-0", "role": "system", "content": "You write.", "date": "" }],
                    "modelConfig": { "temperature": 0.9 },
                    "lang": "en"
                },
                {
                    "id": "coder",
                    "avatar": "1f4bb",
                    "name": "Coder",
                    "modelConfig": { "model": "gpt-4", "max_tokens": 2000 },
                    "lang": "cn"
                }
            ])
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn resolve_lays_overrides_over_defaults() {
        let catalog = catalog();
        let writer = catalog.get("writer").unwrap().resolve(&ModelConfig::default());

        assert!(writer.builtin);
        assert_eq!(writer.model_config.temperature, 0.9);
        assert_eq!(writer.model_config.top_p, 1.0);
        assert_eq!(writer.model_config.model, "gpt-3.5-turbo");
        assert_eq!(writer.context.len(), 1);
    }

    #[test]
    fn resolve_tracks_current_defaults() {
        let catalog = catalog();
        let defaults = ModelConfig {
            temperature: 0.1,
            top_p: 0.7,
            ..ModelConfig::default()
        };

        let coder = catalog.get("coder").unwrap().resolve(&defaults);
        assert_eq!(coder.model_config.model, "gpt-4");
        assert_eq!(coder.model_config.max_tokens, 2000);
        assert_eq!(coder.model_config.temperature, 0.1);
        assert_eq!(coder.model_config.top_p, 0.7);
    }

    #[test]
    fn catalog_keeps_order() {
        let names: Vec<_> = catalog()
            .resolve_all(&ModelConfig::default())
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["Writer", "Coder"]);
    }

    #[test]
    fn from_json_rejects_non_array() {
        let err = BuiltinCatalog::from_json(br#"{"id":"x"}"#).unwrap_err();
        assert!(matches!(err, CoreError::CorruptState { .. }));
        assert!(BuiltinCatalog::from_json(b"[{\"name\":1}]").is_err());
    }

    #[test]
    fn static_defaults_builder() {
        let host = StaticDefaults::new()
            .locale("fr")
            .hide_builtins(true);
        assert_eq!(host.current_locale().as_str(), "fr");
        assert!(host.hide_builtin_masks());

        let shared: Arc<dyn HostDefaults> = Arc::new(host);
        assert!(shared.hide_builtin_masks());
        assert_eq!(shared.current_config(), ModelConfig::default());
    }
}
