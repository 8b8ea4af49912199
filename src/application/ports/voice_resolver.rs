//! Voice Resolver Port - 音色样本解析
//!
//! 根据合成请求参数选出唯一的参考音频路径。两种实现:
//! - 目录存储可用时：基于元数据的 CatalogVoiceResolver
//! - 降级模式：基于文件系统扫描的 DirectoryVoiceResolver

use async_trait::async_trait;
use std::path::PathBuf;

use super::RepositoryError;
use crate::domain::voice::{Gender, VoiceId};

/// 音色解析请求
#[derive(Debug, Clone)]
pub struct ResolveVoice {
    pub language: String,
    pub gender: Gender,
    pub voice_id: Option<VoiceId>,
    pub voice_name: Option<String>,
}

impl ResolveVoice {
    pub fn new(language: impl Into<String>, gender: Gender) -> Self {
        Self {
            language: language.into(),
            gender,
            voice_id: None,
            voice_name: None,
        }
    }

    pub fn with_voice_id(mut self, voice_id: VoiceId) -> Self {
        self.voice_id = Some(voice_id);
        self
    }

    pub fn with_voice_name(mut self, voice_name: impl Into<String>) -> Self {
        self.voice_name = Some(voice_name.into());
        self
    }
}

/// Voice Resolver Port
#[async_trait]
pub trait VoiceResolverPort: Send + Sync {
    /// 解析参考音频路径
    ///
    /// `Ok(None)` 表示没有可用音色，属于常规结果而非故障
    async fn resolve(&self, request: &ResolveVoice) -> Result<Option<PathBuf>, RepositoryError>;

    /// 实现名称（用于日志）
    fn mode(&self) -> &'static str;
}
