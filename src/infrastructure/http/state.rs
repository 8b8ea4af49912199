//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    ApplicationError, CatalogVoiceResolver,
    // Command handlers
    CreateVoiceHandler, DeactivateVoiceHandler, DeleteVoiceHandler, PromoteDefaultVoiceHandler,
    SynthesizeSpeechHandler, UpdateVoiceHandler,
    // Query handlers
    GetDefaultVoiceHandler, GetVoiceHandler, ListVoicesHandler,
    // Ports
    TtsEnginePort, VoiceRepositoryPort, VoiceResolverPort,
};
use crate::infrastructure::adapters::DirectoryVoiceResolver;

/// 音色目录相关 Handlers（需要元数据存储）
pub struct CatalogHandlers {
    // ========== Command Handlers ==========
    pub create_voice_handler: CreateVoiceHandler,
    pub update_voice_handler: UpdateVoiceHandler,
    pub deactivate_voice_handler: DeactivateVoiceHandler,
    pub delete_voice_handler: DeleteVoiceHandler,
    pub promote_default_handler: PromoteDefaultVoiceHandler,

    // ========== Query Handlers ==========
    pub get_voice_handler: GetVoiceHandler,
    pub list_voices_handler: ListVoicesHandler,
    pub get_default_voice_handler: GetDefaultVoiceHandler,
}

impl CatalogHandlers {
    fn new(voice_repo: Arc<dyn VoiceRepositoryPort>) -> Self {
        let promote_default_handler = PromoteDefaultVoiceHandler::new(voice_repo.clone());

        Self {
            create_voice_handler: CreateVoiceHandler::new(
                voice_repo.clone(),
                promote_default_handler.clone(),
            ),
            update_voice_handler: UpdateVoiceHandler::new(voice_repo.clone()),
            deactivate_voice_handler: DeactivateVoiceHandler::new(voice_repo.clone()),
            delete_voice_handler: DeleteVoiceHandler::new(voice_repo.clone()),
            promote_default_handler,
            get_voice_handler: GetVoiceHandler::new(voice_repo.clone()),
            list_voices_handler: ListVoicesHandler::new(voice_repo.clone()),
            get_default_voice_handler: GetDefaultVoiceHandler::new(voice_repo),
        }
    }
}

/// 应用状态
///
/// 未配置元数据存储时 catalog 为 None（降级模式），仅保留语音合成
pub struct AppState {
    pub catalog: Option<CatalogHandlers>,
    pub synthesize_handler: SynthesizeSpeechHandler,
    /// 音色样本根目录
    pub samples_root: PathBuf,
}

impl AppState {
    /// 创建应用状态（元数据存储模式）
    pub fn new(
        voice_repo: Arc<dyn VoiceRepositoryPort>,
        tts_engine: Arc<dyn TtsEnginePort>,
        samples_root: impl Into<PathBuf>,
        synthesis_timeout: Duration,
    ) -> Self {
        let samples_root = samples_root.into();
        let resolver: Arc<dyn VoiceResolverPort> = Arc::new(CatalogVoiceResolver::new(
            voice_repo.clone(),
            samples_root.clone(),
        ));

        Self {
            catalog: Some(CatalogHandlers::new(voice_repo)),
            synthesize_handler: SynthesizeSpeechHandler::new(
                resolver,
                tts_engine,
                synthesis_timeout,
            ),
            samples_root,
        }
    }

    /// 创建应用状态（降级模式：按目录扫描音色样本）
    pub fn degraded(
        tts_engine: Arc<dyn TtsEnginePort>,
        voices_dir: impl Into<PathBuf>,
        synthesis_timeout: Duration,
    ) -> Self {
        let voices_dir = voices_dir.into();
        let resolver: Arc<dyn VoiceResolverPort> =
            Arc::new(DirectoryVoiceResolver::new(voices_dir.clone()));

        Self {
            catalog: None,
            synthesize_handler: SynthesizeSpeechHandler::new(
                resolver,
                tts_engine,
                synthesis_timeout,
            ),
            samples_root: voices_dir,
        }
    }

    /// 获取音色目录 Handlers，降级模式下不可用
    pub fn catalog(&self) -> Result<&CatalogHandlers, ApplicationError> {
        self.catalog.as_ref().ok_or_else(|| {
            ApplicationError::Unavailable(
                "Voice catalog is unavailable: no metadata store configured".to_string(),
            )
        })
    }

    /// 记录中的样本路径（相对路径挂到样本根目录下）
    pub fn sample_path(&self, file_path: &Path) -> PathBuf {
        self.samples_root.join(file_path)
    }
}
