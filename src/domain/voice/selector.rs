//! Voice Context - 音色选择策略
//!
//! 将一次合成请求的参数归类为唯一的一条选择规则：
//! 显式 ID > 显式名称 > (语言, 性别) 默认音色

use super::{Gender, VoiceId, FALLBACK_LANGUAGE};

/// 音色选择规则
///
/// 显式标识（ID / 名称）代表调用方意图，命中失败时不会回退到默认音色
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelector {
    /// 按 ID 精确查找（不过滤 is_active）
    ById(VoiceId),
    /// 按名称精确查找（不过滤 is_active）
    ByName(String),
    /// 查找 (语言, 性别) 的默认音色，必要时回退到英语
    Default { language: String, gender: Gender },
}

impl VoiceSelector {
    pub fn from_request(
        language: &str,
        gender: Gender,
        voice_id: Option<VoiceId>,
        voice_name: Option<&str>,
    ) -> Self {
        if let Some(id) = voice_id {
            return VoiceSelector::ById(id);
        }

        // 名称按原样精确匹配，只有空白名称视为未提供
        match voice_name.filter(|n| !n.trim().is_empty()) {
            Some(name) => VoiceSelector::ByName(name.to_string()),
            None => VoiceSelector::Default {
                language: language.to_string(),
                gender,
            },
        }
    }

    /// 默认规则下依次尝试的语言
    ///
    /// 非回退语言时追加一次英语重试
    pub fn default_languages(language: &str) -> Vec<&str> {
        if language == FALLBACK_LANGUAGE {
            vec![FALLBACK_LANGUAGE]
        } else {
            vec![language, FALLBACK_LANGUAGE]
        }
    }
}
