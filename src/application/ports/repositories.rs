//! Repository Ports - 出站端口
//!
//! 定义音色元数据持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::voice::{Gender, VoiceId};

/// Repository 错误（存储层故障，始终向上传播）
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

// ============================================================================
// Voice Repository
// ============================================================================

/// 音色实体（用于持久化）
///
/// 不变量: 对任意 (language, gender)，满足 is_default && is_active 的记录至多一条。
/// 该不变量只由默认音色协调器维护，存储层本身不校验。
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceRecord {
    pub id: VoiceId,
    pub name: String,
    pub description: Option<String>,
    pub language: String,
    pub gender: Gender,
    pub file_path: PathBuf,
    pub embedding_path: Option<PathBuf>,
    pub is_default: bool,
    pub is_active: bool,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VoiceRecord {
    pub fn matches(&self, language: &str, gender: Gender) -> bool {
        self.language == language && self.gender == gender
    }
}

/// 新建音色所需字段
///
/// is_default 不在此处：默认标记只能经由协调器设置
#[derive(Debug, Clone)]
pub struct NewVoice {
    pub name: String,
    pub description: Option<String>,
    pub language: String,
    pub gender: Gender,
    pub file_path: PathBuf,
    pub embedding_path: Option<PathBuf>,
    pub is_active: bool,
    pub owner_id: Option<i64>,
}

impl NewVoice {
    pub fn new(
        name: impl Into<String>,
        language: impl Into<String>,
        gender: Gender,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            language: language.into(),
            gender,
            file_path: file_path.into(),
            embedding_path: None,
            is_active: true,
            owner_id: None,
        }
    }
}

/// 音色字段变更集
///
/// 只列出可变字段；id 与 is_default 不可经由此路径修改。
/// 可空字段使用 `Option<Option<T>>`：外层 None 表示不变，`Some(None)` 表示清空。
#[derive(Debug, Clone, Default)]
pub struct VoiceChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub language: Option<String>,
    pub gender: Option<Gender>,
    pub file_path: Option<PathBuf>,
    pub embedding_path: Option<Option<PathBuf>>,
    pub is_active: Option<bool>,
    pub owner_id: Option<Option<i64>>,
}

impl VoiceChanges {
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.language.is_none()
            && self.gender.is_none()
            && self.file_path.is_none()
            && self.embedding_path.is_none()
            && self.is_active.is_none()
            && self.owner_id.is_none()
    }

    /// 将变更应用到记录上（不触碰 id / is_default）
    pub fn apply_to(&self, record: &mut VoiceRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(language) = &self.language {
            record.language = language.clone();
        }
        if let Some(gender) = self.gender {
            record.gender = gender;
        }
        if let Some(file_path) = &self.file_path {
            record.file_path = file_path.clone();
        }
        if let Some(embedding_path) = &self.embedding_path {
            record.embedding_path = embedding_path.clone();
        }
        if let Some(is_active) = self.is_active {
            record.is_active = is_active;
        }
        if let Some(owner_id) = self.owner_id {
            record.owner_id = owner_id;
        }
    }
}

/// 音色列表过滤条件（仅返回 is_active 记录）
#[derive(Debug, Clone, Default)]
pub struct VoiceFilter {
    pub language: Option<String>,
    pub gender: Option<Gender>,
}

/// Voice Repository Port
#[async_trait]
pub trait VoiceRepositoryPort: Send + Sync {
    /// 根据 ID 查找音色（不过滤 is_active）
    async fn get(&self, id: VoiceId) -> Result<Option<VoiceRecord>, RepositoryError>;

    /// 根据名称精确查找音色（不过滤 is_active）
    async fn get_by_name(&self, name: &str) -> Result<Option<VoiceRecord>, RepositoryError>;

    /// 按过滤条件列出活跃音色，按插入顺序
    async fn list_active(&self, filter: &VoiceFilter) -> Result<Vec<VoiceRecord>, RepositoryError>;

    /// 列出 (语言, 性别) 下的活跃音色
    async fn list_by_language_and_gender(
        &self,
        language: &str,
        gender: Gender,
    ) -> Result<Vec<VoiceRecord>, RepositoryError> {
        let filter = VoiceFilter {
            language: Some(language.to_string()),
            gender: Some(gender),
        };
        self.list_active(&filter).await
    }

    /// 获取 (语言, 性别) 的默认音色（is_default && is_active）
    async fn get_default(
        &self,
        language: &str,
        gender: Gender,
    ) -> Result<Option<VoiceRecord>, RepositoryError>;

    /// 创建音色，返回分配了 ID 的记录（is_default = false）
    async fn create(&self, voice: NewVoice) -> Result<VoiceRecord, RepositoryError>;

    /// 部分更新音色，ID 不存在时返回 None
    async fn update(
        &self,
        id: VoiceId,
        changes: &VoiceChanges,
    ) -> Result<Option<VoiceRecord>, RepositoryError>;

    /// 物理删除音色，返回是否存在被删除的记录
    async fn delete(&self, id: VoiceId) -> Result<bool, RepositoryError>;

    /// 无条件清除 (语言, 性别) 下所有记录的默认标记（含非活跃记录）
    ///
    /// 仅供默认音色协调器调用
    async fn clear_default_flags(&self, language: &str, gender: Gender)
        -> Result<(), RepositoryError>;

    /// 将属于 (语言, 性别) 的记录标记为默认
    ///
    /// ID 不存在或记录已不属于该组合时返回 None。检查与写入必须是同一次原子操作。
    /// 仅供默认音色协调器调用
    async fn mark_default(
        &self,
        id: VoiceId,
        language: &str,
        gender: Gender,
    ) -> Result<Option<VoiceRecord>, RepositoryError>;

    /// 清除 (语言, 性别) 的默认标记，再将目标记录标记为默认
    ///
    /// 目标被拒绝（返回 None）时清除不回滚。支持事务的存储应在单个事务内完成。
    /// 仅供默认音色协调器调用
    async fn replace_default(
        &self,
        id: VoiceId,
        language: &str,
        gender: Gender,
    ) -> Result<Option<VoiceRecord>, RepositoryError> {
        self.clear_default_flags(language, gender).await?;
        self.mark_default(id, language, gender).await
    }
}
