//! In-Memory Voice Repository Implementation

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::application::ports::{
    NewVoice, RepositoryError, VoiceChanges, VoiceFilter, VoiceRecord, VoiceRepositoryPort,
};
use crate::domain::voice::{Gender, VoiceId};

/// 内存音色仓储
///
/// ID 自 1 递增，列表按 ID 排序（即插入顺序）
pub struct InMemoryVoiceRepository {
    voices: DashMap<VoiceId, VoiceRecord>,
    next_id: AtomicI64,
}

impl InMemoryVoiceRepository {
    pub fn new() -> Self {
        Self {
            voices: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn sorted(&self, predicate: impl Fn(&VoiceRecord) -> bool) -> Vec<VoiceRecord> {
        let mut voices: Vec<VoiceRecord> = self
            .voices
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        voices.sort_by_key(|v| v.id);
        voices
    }
}

impl Default for InMemoryVoiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceRepositoryPort for InMemoryVoiceRepository {
    async fn get(&self, id: VoiceId) -> Result<Option<VoiceRecord>, RepositoryError> {
        Ok(self.voices.get(&id).map(|v| v.clone()))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<VoiceRecord>, RepositoryError> {
        Ok(self.sorted(|v| v.name == name).into_iter().next())
    }

    async fn list_active(&self, filter: &VoiceFilter) -> Result<Vec<VoiceRecord>, RepositoryError> {
        Ok(self.sorted(|v| {
            v.is_active
                && filter.language.as_deref().map_or(true, |l| v.language == l)
                && filter.gender.map_or(true, |g| v.gender == g)
        }))
    }

    async fn get_default(
        &self,
        language: &str,
        gender: Gender,
    ) -> Result<Option<VoiceRecord>, RepositoryError> {
        let defaults = self.sorted(|v| v.is_default && v.is_active && v.matches(language, gender));
        if defaults.len() > 1 {
            tracing::error!(
                language = %language,
                gender = %gender,
                count = defaults.len(),
                "Consistency fault: multiple default voices"
            );
        }
        Ok(defaults.into_iter().next())
    }

    async fn create(&self, voice: NewVoice) -> Result<VoiceRecord, RepositoryError> {
        let id = VoiceId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let now = Utc::now();
        let record = VoiceRecord {
            id,
            name: voice.name,
            description: voice.description,
            language: voice.language,
            gender: voice.gender,
            file_path: voice.file_path,
            embedding_path: voice.embedding_path,
            is_default: false,
            is_active: voice.is_active,
            owner_id: voice.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.voices.insert(id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: VoiceId,
        changes: &VoiceChanges,
    ) -> Result<Option<VoiceRecord>, RepositoryError> {
        let Some(mut entry) = self.voices.get_mut(&id) else {
            return Ok(None);
        };

        let pair = (entry.language.clone(), entry.gender);
        changes.apply_to(&mut entry);
        if (entry.language.clone(), entry.gender) != pair {
            entry.is_default = false;
        }
        entry.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, id: VoiceId) -> Result<bool, RepositoryError> {
        Ok(self.voices.remove(&id).is_some())
    }

    async fn clear_default_flags(
        &self,
        language: &str,
        gender: Gender,
    ) -> Result<(), RepositoryError> {
        for mut entry in self.voices.iter_mut() {
            if entry.matches(language, gender) {
                entry.is_default = false;
            }
        }
        Ok(())
    }

    async fn mark_default(
        &self,
        id: VoiceId,
        language: &str,
        gender: Gender,
    ) -> Result<Option<VoiceRecord>, RepositoryError> {
        let Some(mut entry) = self.voices.get_mut(&id) else {
            return Ok(None);
        };
        if !entry.matches(language, gender) {
            return Ok(None);
        }
        entry.is_default = true;
        entry.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }
}
