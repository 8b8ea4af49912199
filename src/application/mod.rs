//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（VoiceRepository、VoiceResolver、TtsEngine）
//! - commands: CQRS 命令及处理器（含默认音色协调器、语音合成）
//! - queries: CQRS 查询及处理器
//! - resolver: 基于音色目录的样本解析
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod resolver;

// Re-exports
pub use commands::{
    // Voice commands
    CreateVoice,
    DeactivateVoice,
    DeleteVoice,
    PromoteDefaultVoice,
    UpdateVoice,
    // Synthesis commands
    SynthesizeSpeech,
    // Handlers
    handlers::{
        CreateVoiceHandler, DeactivateVoiceHandler, DeleteVoiceHandler,
        PromoteDefaultVoiceHandler, PromotionOutcome, SynthesisOutcome, SynthesizeSpeechHandler,
        SynthesizedSpeech, UpdateVoiceHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Repositories
    NewVoice,
    RepositoryError,
    VoiceChanges,
    VoiceFilter,
    VoiceRecord,
    VoiceRepositoryPort,
    // Voice resolver
    ResolveVoice,
    VoiceResolverPort,
    // TTS engine
    SynthesisRequest,
    SynthesizedAudio,
    TtsEnginePort,
    TtsError,
};

pub use queries::{
    // Voice queries
    GetDefaultVoice,
    GetVoice,
    ListVoices,
    // Handlers
    handlers::{GetDefaultVoiceHandler, GetVoiceHandler, ListVoicesHandler},
};

pub use resolver::CatalogVoiceResolver;
