//! Mask types.

mod id;
mod map;
mod model;
mod model_config;

pub use id::MaskId;
pub use map::MaskMap;
pub use model::{
    default_context, ChatMessage, Lang, Mask, MaskDraft, Role, ARTIFACTS_PLUGIN,
    DEFAULT_MASK_AVATAR, DEFAULT_MASK_NAME,
};
pub use model_config::{ModelConfig, ModelConfigOverrides};
