//! Voice Context - 音色目录限界上下文
//!
//! 职责:
//! - 音色元数据的值对象（ID、性别、名称、语速）
//! - 合成请求的音色选择规则

mod errors;
mod selector;
mod value_objects;

pub use errors::VoiceError;
pub use selector::VoiceSelector;
pub use value_objects::{
    normalize_language, Gender, SpeechSpeed, VoiceId, VoiceName, FALLBACK_LANGUAGE,
};
