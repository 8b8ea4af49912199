//! Voice Commands - 音色目录写操作

use std::path::PathBuf;

use crate::application::ports::VoiceChanges;
use crate::domain::voice::{Gender, VoiceId};

/// 创建音色命令
#[derive(Debug, Clone)]
pub struct CreateVoice {
    pub name: String,
    pub language: String,
    pub gender: Gender,
    pub file_path: PathBuf,
    pub description: Option<String>,
    pub embedding_path: Option<PathBuf>,
    /// 创建后立即提升为 (language, gender) 的默认音色
    pub is_default: bool,
    pub is_active: bool,
    pub owner_id: Option<i64>,
}

/// 更新音色命令（不含 is_default）
#[derive(Debug, Clone)]
pub struct UpdateVoice {
    pub voice_id: VoiceId,
    pub changes: VoiceChanges,
}

/// 停用音色命令（软删除）
#[derive(Debug, Clone)]
pub struct DeactivateVoice {
    pub voice_id: VoiceId,
}

/// 删除音色命令（物理删除）
#[derive(Debug, Clone)]
pub struct DeleteVoice {
    pub voice_id: VoiceId,
}

/// 提升默认音色命令
#[derive(Debug, Clone)]
pub struct PromoteDefaultVoice {
    pub voice_id: VoiceId,
    pub language: String,
    pub gender: Gender,
}
