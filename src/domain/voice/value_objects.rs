//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::VoiceError;

/// 回退语言：指定语言没有默认音色时改用英语
pub const FALLBACK_LANGUAGE: &str = "en";

/// 音色唯一标识（由存储层在创建时分配）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(i64);

impl VoiceId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for VoiceId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 音色性别（封闭枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Neutral => "neutral",
        }
    }
}

impl FromStr for Gender {
    type Err = VoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "neutral" => Ok(Gender::Neutral),
            _ => Err(VoiceError::InvalidGender(s.to_string())),
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Neutral
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 音色名称
///
/// 不变量:
/// - 去除首尾空白后非空
/// - 长度不超过 255 字符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceName(String);

impl VoiceName {
    pub const MAX_LEN: usize = 255;

    pub fn new(name: impl Into<String>) -> Result<Self, VoiceError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(VoiceError::InvalidName("name cannot be empty".to_string()));
        }
        if name.chars().count() > Self::MAX_LEN {
            return Err(VoiceError::InvalidName(format!(
                "name cannot exceed {} characters",
                Self::MAX_LEN
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for VoiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语言代码（不与固定列表校验）
///
/// 要求非空，且不含路径分隔符或 `..`：降级模式下语言代码会拼接为目录名
pub fn normalize_language(language: &str) -> Result<String, VoiceError> {
    let language = language.trim();
    if language.is_empty() {
        return Err(VoiceError::InvalidLanguage("language code cannot be empty".to_string()));
    }
    if language.contains(['/', '\\']) || language.contains("..") {
        return Err(VoiceError::InvalidLanguage(format!(
            "language code cannot contain path components: {}",
            language
        )));
    }
    Ok(language.to_string())
}

/// 语速因子 (0.5 - 2.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SpeechSpeed(f32);

impl SpeechSpeed {
    pub const MIN: f32 = 0.5;
    pub const MAX: f32 = 2.0;

    pub fn new(speed: f32) -> Result<Self, VoiceError> {
        if !speed.is_finite() || !(Self::MIN..=Self::MAX).contains(&speed) {
            return Err(VoiceError::InvalidSpeed(speed));
        }
        Ok(Self(speed))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for SpeechSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}
