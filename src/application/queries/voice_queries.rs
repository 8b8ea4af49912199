//! Voice Queries - 音色目录读操作

use crate::domain::voice::{Gender, VoiceId};

/// 获取音色详情查询（含非活跃音色）
#[derive(Debug, Clone)]
pub struct GetVoice {
    pub voice_id: VoiceId,
}

/// 列出活跃音色查询
#[derive(Debug, Clone, Default)]
pub struct ListVoices {
    pub language: Option<String>,
    pub gender: Option<Gender>,
}

/// 获取 (语言, 性别) 当前默认音色查询（不回退）
#[derive(Debug, Clone)]
pub struct GetDefaultVoice {
    pub language: String,
    pub gender: Gender,
}
