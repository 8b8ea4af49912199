//! Synthesis Commands - 语音合成

use crate::domain::voice::{Gender, VoiceId};

/// 语音合成命令
#[derive(Debug, Clone)]
pub struct SynthesizeSpeech {
    pub text: String,
    pub language: String,
    pub gender: Gender,
    pub voice_id: Option<VoiceId>,
    pub voice_name: Option<String>,
    pub speed: f32,
}
