//! Property-based test generators using proptest.
//!
//! Provides strategies for generating masks, drafts, legacy snapshots and
//! store operation sequences.

use maskstore_core::{
    ChatMessage, Lang, Mask, MaskDraft, MaskId, ModelConfig, Role, SchemaVersion,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Strategy for generating mask IDs.
pub fn mask_id_strategy() -> impl Strategy<Value = MaskId> {
    prop::string::string_regex("[a-z0-9]{1,16}")
        .expect("Invalid regex")
        .prop_map(MaskId::from_string)
}

/// Strategy for generating display names, including mixed case.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9 ]{0,23}").expect("Invalid regex")
}

/// Strategy for generating seed conversation turns.
pub fn chat_message_strategy() -> impl Strategy<Value = ChatMessage> {
    (
        "[a-z0-9-]{1,8}",
        prop_oneof![Just(Role::System), Just(Role::User), Just(Role::Assistant)],
        "[a-zA-Z ]{0,64}",
    )
        .prop_map(|(id, role, content)| ChatMessage::new(id, role, content))
}

/// Strategy for generating model configs with exactly representable floats.
pub fn model_config_strategy() -> impl Strategy<Value = ModelConfig> {
    (
        prop_oneof![Just("gpt-3.5-turbo"), Just("gpt-4"), Just("gpt-4o-mini")],
        0u32..=200,
        0u32..=100,
        1u32..=8192,
        0u32..=32,
    )
        .prop_map(|(model, temperature, top_p, max_tokens, history)| ModelConfig {
            model: model.to_string(),
            temperature: f64::from(temperature) / 100.0,
            top_p: f64::from(top_p) / 100.0,
            max_tokens,
            history_message_count: history,
            ..ModelConfig::default()
        })
}

/// Strategy for generating locale tags.
pub fn lang_strategy() -> impl Strategy<Value = Lang> {
    prop_oneof![Just("en"), Just("cn"), Just("fr"), Just("ja")].prop_map(Lang::new)
}

/// Strategy for generating user masks (never built-in).
pub fn mask_strategy() -> impl Strategy<Value = Mask> {
    (
        mask_id_strategy(),
        0u64..2_000_000_000_000,
        name_strategy(),
        prop::collection::vec(chat_message_strategy(), 0..4),
        model_config_strategy(),
        lang_strategy(),
        any::<Option<bool>>(),
    )
        .prop_map(|(id, created_at, name, context, model_config, lang, hide)| Mask {
            id,
            created_at,
            avatar: "1f916".to_string(),
            name,
            hide_context: hide,
            context,
            sync_global_config: Some(false),
            model_config,
            lang,
            builtin: false,
            plugin: None,
            extra: Map::new(),
        })
}

/// Strategy for generating drafts with a random subset of fields set.
pub fn mask_draft_strategy() -> impl Strategy<Value = MaskDraft> {
    (
        prop::option::of(name_strategy()),
        prop::option::of(0u64..1_000_000),
        prop::option::of(lang_strategy()),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(name, created_at, lang, hide_context)| MaskDraft {
            name,
            created_at,
            lang,
            hide_context,
            ..MaskDraft::default()
        })
}

/// Strategy for generating one raw mask as an older build stored it.
///
/// The `id` may be a number, a string, or missing entirely.
pub fn legacy_mask_value_strategy() -> impl Strategy<Value = Value> {
    let id = prop_oneof![
        (0u64..1000).prop_map(|n| json!(n)),
        "[a-z0-9]{1,12}".prop_map(|s| json!(s)),
        Just(Value::Null),
    ];
    (id, name_strategy(), 0u64..1_000_000).prop_map(|(id, name, created_at)| {
        let mut mask = json!({ "name": name, "createdAt": created_at, "avatar": "1f47e" });
        if !id.is_null() {
            mask["id"] = id;
        }
        mask
    })
}

/// Strategy for generating a raw state and the version it claims.
///
/// Keys are positional (`"0"`, `"1"`, ...) so they rarely equal the ids.
pub fn legacy_snapshot_strategy() -> impl Strategy<Value = (Value, SchemaVersion)> {
    let version = prop_oneof![
        Just(SchemaVersion::INITIAL),
        Just(SchemaVersion::new(2, 0)),
        Just(SchemaVersion::new(3, 0)),
    ];
    (
        prop::collection::vec(legacy_mask_value_strategy(), 0..12),
        version,
    )
        .prop_map(|(masks, version)| {
            let masks: Map<String, Value> = masks
                .into_iter()
                .enumerate()
                .map(|(i, m)| (i.to_string(), m))
                .collect();
            (json!({ "masks": masks }), version)
        })
}

/// A single store operation.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// Create a mask from a draft.
    Create {
        /// Caller-supplied fields.
        draft: MaskDraft,
    },
    /// Rename the mask at `index` (modulo the live count).
    Rename {
        /// Position in creation order.
        index: usize,
        /// New name.
        name: String,
    },
    /// Delete the mask at `index` (modulo the live count).
    Delete {
        /// Position in creation order.
        index: usize,
    },
}

/// Strategy for generating store operations.
pub fn store_operation_strategy() -> impl Strategy<Value = StoreOperation> {
    prop_oneof![
        3 => mask_draft_strategy().prop_map(|draft| StoreOperation::Create { draft }),
        2 => (any::<usize>(), name_strategy())
            .prop_map(|(index, name)| StoreOperation::Rename { index, name }),
        1 => any::<usize>().prop_map(|index| StoreOperation::Delete { index }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StoreOperation>> {
    prop::collection::vec(store_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropertyTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropertyTestConfig {
    fn default() -> Self {
        Self {
            cases: 64,
            max_shrink_iters: 1000,
        }
    }
}

impl PropertyTestConfig {
    /// Converts to a proptest config.
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
