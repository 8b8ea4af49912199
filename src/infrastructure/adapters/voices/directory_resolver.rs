//! Directory Voice Resolver - 无元数据存储时的降级解析
//!
//! 目录布局: `<voices_dir>/<language>/<gender>/`
//!
//! 取该目录列举顺序下的第一个条目；找不到且语言不是 "en" 时改扫 `en/<gender>/`。
//! 此模式没有显式 voice_id / voice_name，也没有默认音色的概念。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{RepositoryError, ResolveVoice, VoiceResolverPort};
use crate::domain::voice::{Gender, VoiceSelector};

/// 文件系统音色解析器
pub struct DirectoryVoiceResolver {
    voices_dir: PathBuf,
}

impl DirectoryVoiceResolver {
    pub fn new(voices_dir: impl Into<PathBuf>) -> Self {
        Self {
            voices_dir: voices_dir.into(),
        }
    }

    fn gender_dir(&self, language: &str, gender: Gender) -> PathBuf {
        self.voices_dir.join(language).join(gender.as_str())
    }

    /// 目录中的第一个条目，目录不存在或为空时返回 None
    async fn first_entry(dir: &Path) -> Result<Option<PathBuf>, RepositoryError> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::IoError(format!("{}: {}", dir.display(), e))),
        };

        let entry = entries
            .next_entry()
            .await
            .map_err(|e| RepositoryError::IoError(format!("{}: {}", dir.display(), e)))?;

        Ok(entry.map(|e| e.path()))
    }
}

#[async_trait]
impl VoiceResolverPort for DirectoryVoiceResolver {
    async fn resolve(&self, request: &ResolveVoice) -> Result<Option<PathBuf>, RepositoryError> {
        if request.voice_id.is_some() || request.voice_name.is_some() {
            tracing::debug!(
                voice_id = ?request.voice_id,
                voice_name = ?request.voice_name,
                "Explicit voice selection is ignored without a voice catalog"
            );
        }

        for language in VoiceSelector::default_languages(&request.language) {
            let dir = self.gender_dir(language, request.gender);
            if let Some(path) = Self::first_entry(&dir).await? {
                tracing::debug!(path = %path.display(), "Voice sample found by directory scan");
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    fn mode(&self) -> &'static str {
        "directory"
    }
}
