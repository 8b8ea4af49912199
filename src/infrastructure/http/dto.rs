//! Data Transfer Objects

use serde::{Deserialize, Deserializer, Serialize};

use crate::application::VoiceRecord;
use crate::domain::voice::{Gender, VoiceId, FALLBACK_LANGUAGE};

use super::error::ApiError;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

/// 区分字段缺失（None）与显式 null（Some(None)）
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn default_language() -> String {
    FALLBACK_LANGUAGE.to_string()
}

fn default_gender() -> String {
    Gender::Female.as_str().to_string()
}

fn default_true() -> bool {
    true
}

fn default_speed() -> f32 {
    1.0
}

/// 在请求边界解析性别
pub fn parse_gender(value: &str) -> Result<Gender, ApiError> {
    value
        .parse::<Gender>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

// ============================================================================
// TTS DTOs
// ============================================================================

/// 语音合成请求
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default)]
    pub voice_id: Option<VoiceId>,
    #[serde(default)]
    pub voice_name: Option<String>,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

/// 音色列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ListVoicesParams {
    pub language: Option<String>,
    pub gender: Option<String>,
}

/// 可用音色概要
#[derive(Debug, Serialize)]
pub struct VoiceSummary {
    pub id: VoiceId,
    pub name: String,
    pub language: String,
    pub gender: Gender,
    pub description: Option<String>,
    pub is_default: bool,
}

impl From<VoiceRecord> for VoiceSummary {
    fn from(v: VoiceRecord) -> Self {
        Self {
            id: v.id,
            name: v.name,
            language: v.language,
            gender: v.gender,
            description: v.description,
            is_default: v.is_default,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceListResponse {
    pub voices: Vec<VoiceSummary>,
}

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateVoiceRequest {
    pub name: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub gender: String,
    pub file_path: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub embedding_path: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub owner_id: Option<i64>,
}

/// 部分更新请求：缺失字段不变，可空字段传 null 表示清空
#[derive(Debug, Deserialize)]
pub struct UpdateVoiceRequest {
    pub id: VoiceId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub embedding_path: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub owner_id: Option<Option<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct VoiceIdRequest {
    pub id: VoiceId,
}

#[derive(Debug, Deserialize)]
pub struct SetDefaultVoiceRequest {
    pub id: VoiceId,
    pub language: String,
    pub gender: String,
}

#[derive(Debug, Deserialize)]
pub struct DefaultVoiceRequest {
    pub language: String,
    pub gender: String,
}

/// 音色完整信息（管理视图）
#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    pub id: VoiceId,
    pub name: String,
    pub description: Option<String>,
    pub language: String,
    pub gender: Gender,
    pub file_path: String,
    pub embedding_path: Option<String>,
    pub is_default: bool,
    pub is_active: bool,
    pub owner_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<VoiceRecord> for VoiceResponse {
    fn from(v: VoiceRecord) -> Self {
        Self {
            id: v.id,
            name: v.name,
            description: v.description,
            language: v.language,
            gender: v.gender,
            file_path: v.file_path.to_string_lossy().to_string(),
            embedding_path: v
                .embedding_path
                .map(|p| p.to_string_lossy().to_string()),
            is_default: v.is_default,
            is_active: v.is_active,
            owner_id: v.owner_id,
            created_at: v.created_at.to_rfc3339(),
            updated_at: v.updated_at.to_rfc3339(),
        }
    }
}
