//! Catalog Voice Resolver - 基于音色目录的样本解析
//!
//! 按严格优先级选择音色，首个命中的规则生效：
//! 1. voice_id：按 ID 查找，失败即返回 None（不回退）
//! 2. voice_name：按名称查找，失败即返回 None（不回退）
//! 3. (language, gender) 的默认音色
//! 4. language 不是 "en" 时，改用 ("en", gender) 的默认音色
//!
//! 命中的记录还必须在文件系统上存在参考音频，否则视为未命中。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::{
    RepositoryError, ResolveVoice, VoiceRecord, VoiceRepositoryPort, VoiceResolverPort,
};
use crate::domain::voice::{Gender, VoiceSelector};

/// 基于元数据存储的音色解析器
pub struct CatalogVoiceResolver {
    voice_repo: Arc<dyn VoiceRepositoryPort>,
    /// 相对路径样本的根目录
    samples_root: PathBuf,
}

impl CatalogVoiceResolver {
    pub fn new(voice_repo: Arc<dyn VoiceRepositoryPort>, samples_root: impl Into<PathBuf>) -> Self {
        Self {
            voice_repo,
            samples_root: samples_root.into(),
        }
    }

    /// 记录中的路径为相对路径时，挂到样本根目录下
    fn sample_path(&self, voice: &VoiceRecord) -> PathBuf {
        self.samples_root.join(&voice.file_path)
    }

    /// 返回记录的样本路径（样本文件必须存在）
    async fn present_sample(&self, voice: &VoiceRecord) -> Option<PathBuf> {
        let path = self.sample_path(voice);
        if sample_exists(&path).await {
            Some(path)
        } else {
            tracing::warn!(
                voice_id = %voice.id,
                name = %voice.name,
                path = %path.display(),
                "Voice sample file is missing"
            );
            None
        }
    }

    async fn resolve_default(
        &self,
        language: &str,
        gender: Gender,
    ) -> Result<Option<PathBuf>, RepositoryError> {
        for candidate in VoiceSelector::default_languages(language) {
            let Some(voice) = self.voice_repo.get_default(candidate, gender).await? else {
                tracing::debug!(language = %candidate, gender = %gender, "No default voice");
                continue;
            };

            if let Some(path) = self.present_sample(&voice).await {
                if candidate != language {
                    tracing::info!(
                        requested = %language,
                        fallback = %candidate,
                        gender = %gender,
                        voice_id = %voice.id,
                        "Falling back to default voice of fallback language"
                    );
                }
                return Ok(Some(path));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl VoiceResolverPort for CatalogVoiceResolver {
    async fn resolve(&self, request: &ResolveVoice) -> Result<Option<PathBuf>, RepositoryError> {
        let selector = VoiceSelector::from_request(
            &request.language,
            request.gender,
            request.voice_id,
            request.voice_name.as_deref(),
        );

        let voice = match &selector {
            VoiceSelector::ById(id) => self.voice_repo.get(*id).await?,
            VoiceSelector::ByName(name) => self.voice_repo.get_by_name(name).await?,
            VoiceSelector::Default { language, gender } => {
                return self.resolve_default(language, *gender).await;
            }
        };

        match voice {
            Some(voice) => Ok(self.present_sample(&voice).await),
            None => {
                tracing::debug!(selector = ?selector, "Explicitly requested voice not found");
                Ok(None)
            }
        }
    }

    fn mode(&self) -> &'static str {
        "catalog"
    }
}

async fn sample_exists(path: &Path) -> bool {
    matches!(tokio::fs::try_exists(path).await, Ok(true))
}
