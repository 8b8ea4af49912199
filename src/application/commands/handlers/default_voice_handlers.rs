//! Default Voice Command Handlers - 默认音色协调器
//!
//! 维护“每个 (语言, 性别) 至多一个默认音色”的不变量。
//! 所有对 is_default 的写入都必须经过这里。
//!
//! 提升流程（严格有序）：
//! 1. 无条件清除该 (语言, 性别) 下所有记录的默认标记
//! 2. 目标音色仍属于该组合时将其标记为默认，组合校验与写入是同一条存储操作
//! 3. 目标不存在或 (语言, 性别) 不匹配时拒绝，且第 1 步不回滚，
//!    该组合将没有默认音色（解析时会回退到英语）
//!
//! 第 1、2 步经由 `replace_default` 执行，SQLite 存储在单个事务内完成。
//! 同一 (语言, 性别) 的并发提升通过按组合划分的互斥锁串行执行，不同组合互不阻塞。

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::commands::PromoteDefaultVoice;
use crate::application::error::ApplicationError;
use crate::application::ports::{VoiceRecord, VoiceRepositoryPort};
use crate::domain::voice::{normalize_language, Gender};

/// 提升结果
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionOutcome {
    /// 提升成功，返回更新后的记录
    Promoted(VoiceRecord),
    /// 目标不存在或不属于该 (语言, 性别)
    Rejected,
}

impl PromotionOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, PromotionOutcome::Rejected)
    }
}

type PairKey = (String, Gender);

/// PromoteDefaultVoice Handler
///
/// Clone 后共享同一组锁
#[derive(Clone)]
pub struct PromoteDefaultVoiceHandler {
    voice_repo: Arc<dyn VoiceRepositoryPort>,
    pair_locks: Arc<DashMap<PairKey, Arc<Mutex<()>>>>,
}

impl PromoteDefaultVoiceHandler {
    pub fn new(voice_repo: Arc<dyn VoiceRepositoryPort>) -> Self {
        Self {
            voice_repo,
            pair_locks: Arc::new(DashMap::new()),
        }
    }

    fn pair_lock(&self, language: &str, gender: Gender) -> Arc<Mutex<()>> {
        self.pair_locks
            .entry((language.to_string(), gender))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn handle(
        &self,
        command: PromoteDefaultVoice,
    ) -> Result<PromotionOutcome, ApplicationError> {
        let language = normalize_language(&command.language)?;
        let gender = command.gender;

        let lock = self.pair_lock(&language, gender);
        let _guard = lock.lock().await;

        // 清除与带组合校验的标记在存储内原子完成，期间被改到其他组合的记录会被拒绝
        let promoted = self
            .voice_repo
            .replace_default(command.voice_id, &language, gender)
            .await?;

        if let Some(promoted) = promoted {
            tracing::info!(
                voice_id = %promoted.id,
                name = %promoted.name,
                language = %language,
                gender = %gender,
                "Default voice promoted"
            );
            return Ok(PromotionOutcome::Promoted(promoted));
        }

        match self.voice_repo.get(command.voice_id).await? {
            Some(voice) => tracing::warn!(
                voice_id = %command.voice_id,
                voice_language = %voice.language,
                voice_gender = %voice.gender,
                language = %language,
                gender = %gender,
                "Default promotion rejected: voice belongs to another language/gender; pair left without default"
            ),
            None => tracing::warn!(
                voice_id = %command.voice_id,
                language = %language,
                gender = %gender,
                "Default promotion rejected: voice not found; pair left without default"
            ),
        }

        Ok(PromotionOutcome::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{NewVoice, RepositoryError, VoiceChanges, VoiceFilter};
    use crate::domain::voice::VoiceId;
    use crate::infrastructure::memory::InMemoryVoiceRepository;
    use async_trait::async_trait;

    /// 在标记默认之前把目标音色改到另一种语言，模拟并发的 UpdateVoice
    struct RelocatingRepository {
        inner: Arc<InMemoryVoiceRepository>,
        relocate_to: String,
    }

    #[async_trait]
    impl VoiceRepositoryPort for RelocatingRepository {
        async fn get(&self, id: VoiceId) -> Result<Option<VoiceRecord>, RepositoryError> {
            self.inner.get(id).await
        }

        async fn get_by_name(&self, name: &str) -> Result<Option<VoiceRecord>, RepositoryError> {
            self.inner.get_by_name(name).await
        }

        async fn list_active(
            &self,
            filter: &VoiceFilter,
        ) -> Result<Vec<VoiceRecord>, RepositoryError> {
            self.inner.list_active(filter).await
        }

        async fn get_default(
            &self,
            language: &str,
            gender: Gender,
        ) -> Result<Option<VoiceRecord>, RepositoryError> {
            self.inner.get_default(language, gender).await
        }

        async fn create(&self, voice: NewVoice) -> Result<VoiceRecord, RepositoryError> {
            self.inner.create(voice).await
        }

        async fn update(
            &self,
            id: VoiceId,
            changes: &VoiceChanges,
        ) -> Result<Option<VoiceRecord>, RepositoryError> {
            self.inner.update(id, changes).await
        }

        async fn delete(&self, id: VoiceId) -> Result<bool, RepositoryError> {
            self.inner.delete(id).await
        }

        async fn clear_default_flags(
            &self,
            language: &str,
            gender: Gender,
        ) -> Result<(), RepositoryError> {
            self.inner.clear_default_flags(language, gender).await
        }

        async fn mark_default(
            &self,
            id: VoiceId,
            language: &str,
            gender: Gender,
        ) -> Result<Option<VoiceRecord>, RepositoryError> {
            let relocate = VoiceChanges {
                language: Some(self.relocate_to.clone()),
                ..Default::default()
            };
            self.inner.update(id, &relocate).await?;
            self.inner.mark_default(id, language, gender).await
        }
    }

    async fn seed(repo: &InMemoryVoiceRepository, name: &str, language: &str, gender: Gender) -> VoiceRecord {
        repo.create(NewVoice::new(name, language, gender, format!("{}.wav", name)))
            .await
            .unwrap()
    }

    async fn default_count(repo: &InMemoryVoiceRepository, language: &str, gender: Gender) -> usize {
        repo.list_by_language_and_gender(language, gender)
            .await
            .unwrap()
            .iter()
            .filter(|v| v.is_default)
            .count()
    }

    fn promote(voice_id: VoiceId, language: &str, gender: Gender) -> PromoteDefaultVoice {
        PromoteDefaultVoice {
            voice_id,
            language: language.to_string(),
            gender,
        }
    }

    #[tokio::test]
    async fn test_promote_replaces_previous_default() {
        let repo = InMemoryVoiceRepository::new().arc();
        let handler = PromoteDefaultVoiceHandler::new(repo.clone());
        let carolina = seed(&repo, "Carolina Ruiz", "es", Gender::Female).await;
        let lucia = seed(&repo, "Lucia", "es", Gender::Female).await;

        let first = handler.handle(promote(carolina.id, "es", Gender::Female)).await.unwrap();
        assert!(matches!(first, PromotionOutcome::Promoted(ref v) if v.id == carolina.id && v.is_default));

        let second = handler.handle(promote(lucia.id, "es", Gender::Female)).await.unwrap();
        assert!(!second.is_rejected());

        assert!(!repo.get(carolina.id).await.unwrap().unwrap().is_default);
        assert!(repo.get(lucia.id).await.unwrap().unwrap().is_default);
        assert_eq!(default_count(&repo, "es", Gender::Female).await, 1);
    }

    #[tokio::test]
    async fn test_rejected_promotion_leaves_no_default() {
        let repo = InMemoryVoiceRepository::new().arc();
        let handler = PromoteDefaultVoiceHandler::new(repo.clone());
        let mark = seed(&repo, "Mark", "en", Gender::Male).await;
        let david = seed(&repo, "David Martin", "es", Gender::Male).await;

        handler.handle(promote(mark.id, "en", Gender::Male)).await.unwrap();
        assert_eq!(default_count(&repo, "en", Gender::Male).await, 1);

        // 语言不匹配
        let mismatch = handler.handle(promote(david.id, "en", Gender::Male)).await.unwrap();
        assert_eq!(mismatch, PromotionOutcome::Rejected);
        assert_eq!(default_count(&repo, "en", Gender::Male).await, 0);
        assert!(!repo.get(david.id).await.unwrap().unwrap().is_default);

        handler.handle(promote(mark.id, "en", Gender::Male)).await.unwrap();

        // ID 不存在
        let missing = handler.handle(promote(VoiceId::new(999), "en", Gender::Male)).await.unwrap();
        assert!(missing.is_rejected());
        assert!(repo.get_default("en", Gender::Male).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_promotion_clears_inactive_defaults_too() {
        let repo = InMemoryVoiceRepository::new().arc();
        let handler = PromoteDefaultVoiceHandler::new(repo.clone());
        let old = seed(&repo, "Old", "de", Gender::Male).await;
        let new = seed(&repo, "MikeyPikey", "de", Gender::Male).await;

        handler.handle(promote(old.id, "de", Gender::Male)).await.unwrap();
        repo.update(old.id, &VoiceChanges::deactivate()).await.unwrap();
        handler.handle(promote(new.id, "de", Gender::Male)).await.unwrap();

        // 重新启用旧音色后仍只有一个默认
        let reactivate = VoiceChanges {
            is_active: Some(true),
            ..Default::default()
        };
        repo.update(old.id, &reactivate).await.unwrap();
        assert_eq!(default_count(&repo, "de", Gender::Male).await, 1);
        assert_eq!(
            repo.get_default("de", Gender::Male).await.unwrap().unwrap().id,
            new.id
        );
    }

    #[tokio::test]
    async fn test_concurrent_promotions_keep_single_default() {
        let repo = InMemoryVoiceRepository::new().arc();
        let handler = PromoteDefaultVoiceHandler::new(repo.clone());

        let mut ids = Vec::new();
        for i in 0..8 {
            ids.push(seed(&repo, &format!("voice-{}", i), "it", Gender::Female).await.id);
        }

        let tasks: Vec<_> = ids
            .iter()
            .map(|id| {
                let handler = handler.clone();
                let command = promote(*id, "it", Gender::Female);
                tokio::spawn(async move { handler.handle(command).await })
            })
            .collect();

        for task in tasks {
            let outcome = task.await.unwrap().unwrap();
            assert!(!outcome.is_rejected());
        }

        assert_eq!(default_count(&repo, "it", Gender::Female).await, 1);
    }

    #[tokio::test]
    async fn test_voice_moved_during_promotion_is_rejected() {
        let memory = InMemoryVoiceRepository::new().arc();
        let pablo = seed(&memory, "Pablo", "es", Gender::Male).await;
        let mark = seed(&memory, "Mark", "en", Gender::Male).await;
        memory.mark_default(pablo.id, "es", Gender::Male).await.unwrap();

        let repo = Arc::new(RelocatingRepository {
            inner: memory.clone(),
            relocate_to: "es".to_string(),
        });
        let handler = PromoteDefaultVoiceHandler::new(repo);

        let outcome = handler.handle(promote(mark.id, "en", Gender::Male)).await.unwrap();
        assert_eq!(outcome, PromotionOutcome::Rejected);

        let es_defaults: Vec<VoiceId> = memory
            .list_by_language_and_gender("es", Gender::Male)
            .await
            .unwrap()
            .into_iter()
            .filter(|v| v.is_default)
            .map(|v| v.id)
            .collect();
        assert_eq!(es_defaults, vec![pablo.id]);
        assert_eq!(default_count(&memory, "en", Gender::Male).await, 0);
        assert!(!memory.get(mark.id).await.unwrap().unwrap().is_default);
    }
}
