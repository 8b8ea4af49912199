//! Voice Command Handlers - 音色目录写操作

use std::path::Path;
use std::sync::Arc;

use crate::application::commands::{
    CreateVoice, DeactivateVoice, DeleteVoice, PromoteDefaultVoice, UpdateVoice,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{NewVoice, VoiceChanges, VoiceRecord, VoiceRepositoryPort};
use crate::domain::voice::{normalize_language, VoiceError, VoiceId, VoiceName};

use super::{PromoteDefaultVoiceHandler, PromotionOutcome};

fn validate_file_path(path: &Path) -> Result<(), VoiceError> {
    if path.as_os_str().is_empty() {
        return Err(VoiceError::InvalidFilePath("file path cannot be empty".to_string()));
    }
    Ok(())
}

/// 名称在目录内唯一（存储层不约束，由调用方检查）
async fn ensure_name_available(
    voice_repo: &dyn VoiceRepositoryPort,
    name: &VoiceName,
    except: Option<VoiceId>,
) -> Result<(), ApplicationError> {
    if let Some(existing) = voice_repo.get_by_name(name.as_str()).await? {
        if Some(existing.id) != except {
            return Err(ApplicationError::conflict(format!(
                "Voice name already exists: {}",
                name
            )));
        }
    }
    Ok(())
}

// ============================================================================
// CreateVoice
// ============================================================================

/// CreateVoice Handler
pub struct CreateVoiceHandler {
    voice_repo: Arc<dyn VoiceRepositoryPort>,
    promote_handler: PromoteDefaultVoiceHandler,
}

impl CreateVoiceHandler {
    pub fn new(
        voice_repo: Arc<dyn VoiceRepositoryPort>,
        promote_handler: PromoteDefaultVoiceHandler,
    ) -> Self {
        Self {
            voice_repo,
            promote_handler,
        }
    }

    pub async fn handle(&self, command: CreateVoice) -> Result<VoiceRecord, ApplicationError> {
        let name = VoiceName::new(command.name)?;
        let language = normalize_language(&command.language)?;
        validate_file_path(&command.file_path)?;

        ensure_name_available(self.voice_repo.as_ref(), &name, None).await?;

        let voice = self
            .voice_repo
            .create(NewVoice {
                name: name.into_inner(),
                description: command.description,
                language,
                gender: command.gender,
                file_path: command.file_path,
                embedding_path: command.embedding_path,
                is_active: command.is_active,
                owner_id: command.owner_id,
            })
            .await?;

        tracing::info!(
            voice_id = %voice.id,
            name = %voice.name,
            language = %voice.language,
            gender = %voice.gender,
            "Voice created"
        );

        if !command.is_default {
            return Ok(voice);
        }

        // 默认标记只能经由协调器设置
        let promotion = PromoteDefaultVoice {
            voice_id: voice.id,
            language: voice.language.clone(),
            gender: voice.gender,
        };
        match self.promote_handler.handle(promotion).await? {
            PromotionOutcome::Promoted(promoted) => Ok(promoted),
            PromotionOutcome::Rejected => Err(ApplicationError::internal(format!(
                "Voice {} vanished before default promotion",
                voice.id
            ))),
        }
    }
}

// ============================================================================
// UpdateVoice
// ============================================================================

/// UpdateVoice Handler
pub struct UpdateVoiceHandler {
    voice_repo: Arc<dyn VoiceRepositoryPort>,
}

impl UpdateVoiceHandler {
    pub fn new(voice_repo: Arc<dyn VoiceRepositoryPort>) -> Self {
        Self { voice_repo }
    }

    pub async fn handle(&self, command: UpdateVoice) -> Result<VoiceRecord, ApplicationError> {
        let voice_id = command.voice_id;
        let mut changes = command.changes;

        if let Some(name) = changes.name.take() {
            let name = VoiceName::new(name)?;
            ensure_name_available(self.voice_repo.as_ref(), &name, Some(voice_id)).await?;
            changes.name = Some(name.into_inner());
        }
        if let Some(language) = changes.language.take() {
            changes.language = Some(normalize_language(&language)?);
        }
        if let Some(file_path) = &changes.file_path {
            validate_file_path(file_path)?;
        }

        let voice = self
            .voice_repo
            .update(voice_id, &changes)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Voice", voice_id))?;

        tracing::info!(
            voice_id = %voice_id,
            name = %voice.name,
            is_active = voice.is_active,
            "Voice updated"
        );

        Ok(voice)
    }
}

// ============================================================================
// DeactivateVoice
// ============================================================================

/// DeactivateVoice Handler
///
/// 软删除：记录保留，但不再出现在列表与默认音色查询中
pub struct DeactivateVoiceHandler {
    voice_repo: Arc<dyn VoiceRepositoryPort>,
}

impl DeactivateVoiceHandler {
    pub fn new(voice_repo: Arc<dyn VoiceRepositoryPort>) -> Self {
        Self { voice_repo }
    }

    pub async fn handle(&self, command: DeactivateVoice) -> Result<VoiceRecord, ApplicationError> {
        let voice = self
            .voice_repo
            .update(command.voice_id, &VoiceChanges::deactivate())
            .await?
            .ok_or_else(|| ApplicationError::not_found("Voice", command.voice_id))?;

        tracing::info!(voice_id = %voice.id, name = %voice.name, "Voice deactivated");

        Ok(voice)
    }
}

// ============================================================================
// DeleteVoice
// ============================================================================

/// DeleteVoice Handler
pub struct DeleteVoiceHandler {
    voice_repo: Arc<dyn VoiceRepositoryPort>,
}

impl DeleteVoiceHandler {
    pub fn new(voice_repo: Arc<dyn VoiceRepositoryPort>) -> Self {
        Self { voice_repo }
    }

    pub async fn handle(&self, command: DeleteVoice) -> Result<(), ApplicationError> {
        let voice_id = command.voice_id;

        if !self.voice_repo.delete(voice_id).await? {
            return Err(ApplicationError::not_found("Voice", voice_id));
        }

        tracing::info!(voice_id = %voice_id, "Voice deleted");

        Ok(())
    }
}
