//! VokaFlow - 语音合成音色目录服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice Context: 音色值对象与解析选择器
//!
//! 应用层 (application/):
//! - Ports: 端口定义（VoiceRepository, VoiceResolver, TtsEngine）
//! - Commands: CQRS 命令处理器（含默认音色协调器、语音合成）
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Memory: VoiceRepository 内存实现
//! - Persistence: SQLite 存储
//! - Adapters: TTS Client, 目录音色解析

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
