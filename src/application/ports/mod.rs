//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod repositories;
mod tts_engine;
mod voice_resolver;

pub use repositories::{
    NewVoice, RepositoryError, VoiceChanges, VoiceFilter, VoiceRecord, VoiceRepositoryPort,
};
pub use tts_engine::{SynthesisRequest, SynthesizedAudio, TtsEnginePort, TtsError};
pub use voice_resolver::{ResolveVoice, VoiceResolverPort};
