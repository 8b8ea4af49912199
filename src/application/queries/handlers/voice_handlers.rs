//! Voice Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{VoiceFilter, VoiceRecord, VoiceRepositoryPort};
use crate::application::queries::{GetDefaultVoice, GetVoice, ListVoices};
use crate::domain::voice::normalize_language;

// ============================================================================
// Handlers
// ============================================================================

/// GetVoice Handler
pub struct GetVoiceHandler {
    voice_repo: Arc<dyn VoiceRepositoryPort>,
}

impl GetVoiceHandler {
    pub fn new(voice_repo: Arc<dyn VoiceRepositoryPort>) -> Self {
        Self { voice_repo }
    }

    pub async fn handle(&self, query: GetVoice) -> Result<VoiceRecord, ApplicationError> {
        self.voice_repo
            .get(query.voice_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Voice", query.voice_id))
    }
}

/// ListVoices Handler
pub struct ListVoicesHandler {
    voice_repo: Arc<dyn VoiceRepositoryPort>,
}

impl ListVoicesHandler {
    pub fn new(voice_repo: Arc<dyn VoiceRepositoryPort>) -> Self {
        Self { voice_repo }
    }

    pub async fn handle(&self, query: ListVoices) -> Result<Vec<VoiceRecord>, ApplicationError> {
        let language = query
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        let voices = match (language, query.gender) {
            (Some(language), Some(gender)) => {
                self.voice_repo
                    .list_by_language_and_gender(&language, gender)
                    .await?
            }
            (language, gender) => {
                self.voice_repo
                    .list_active(&VoiceFilter { language, gender })
                    .await?
            }
        };

        Ok(voices)
    }
}

/// GetDefaultVoice Handler
pub struct GetDefaultVoiceHandler {
    voice_repo: Arc<dyn VoiceRepositoryPort>,
}

impl GetDefaultVoiceHandler {
    pub fn new(voice_repo: Arc<dyn VoiceRepositoryPort>) -> Self {
        Self { voice_repo }
    }

    pub async fn handle(
        &self,
        query: GetDefaultVoice,
    ) -> Result<Option<VoiceRecord>, ApplicationError> {
        let language = normalize_language(&query.language)?;
        Ok(self.voice_repo.get_default(&language, query.gender).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{NewVoice, VoiceChanges};
    use crate::domain::voice::{Gender, VoiceId};
    use crate::infrastructure::memory::InMemoryVoiceRepository;

    async fn catalog() -> Arc<InMemoryVoiceRepository> {
        let repo = InMemoryVoiceRepository::new().arc();
        for (name, language, gender) in [
            ("Carolina Ruiz", "es", Gender::Female),
            ("David Martin", "es", Gender::Male),
            ("Rachel", "en", Gender::Female),
            ("Mark", "en", Gender::Male),
        ] {
            repo.create(NewVoice::new(name, language, gender, format!("{}.mp3", name)))
                .await
                .unwrap();
        }
        repo
    }

    fn names(voices: &[VoiceRecord]) -> Vec<&str> {
        voices.iter().map(|v| v.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_filters() {
        let repo = catalog().await;
        let handler = ListVoicesHandler::new(repo.clone());

        let all = handler.handle(ListVoices::default()).await.unwrap();
        assert_eq!(names(&all), vec!["Carolina Ruiz", "David Martin", "Rachel", "Mark"]);

        let spanish = handler
            .handle(ListVoices { language: Some("es".to_string()), gender: None })
            .await
            .unwrap();
        assert_eq!(names(&spanish), vec!["Carolina Ruiz", "David Martin"]);

        let female = handler
            .handle(ListVoices { language: None, gender: Some(Gender::Female) })
            .await
            .unwrap();
        assert_eq!(names(&female), vec!["Carolina Ruiz", "Rachel"]);

        let english_male = handler
            .handle(ListVoices { language: Some("en".to_string()), gender: Some(Gender::Male) })
            .await
            .unwrap();
        assert_eq!(names(&english_male), vec!["Mark"]);
    }

    #[tokio::test]
    async fn test_list_hides_inactive_but_get_shows_it() {
        let repo = catalog().await;
        let rachel = repo.get_by_name("Rachel").await.unwrap().unwrap();
        repo.update(rachel.id, &VoiceChanges::deactivate()).await.unwrap();

        let list = ListVoicesHandler::new(repo.clone())
            .handle(ListVoices { language: Some("en".to_string()), gender: None })
            .await
            .unwrap();
        assert_eq!(names(&list), vec!["Mark"]);

        let voice = GetVoiceHandler::new(repo.clone())
            .handle(GetVoice { voice_id: rachel.id })
            .await
            .unwrap();
        assert!(!voice.is_active);

        let err = GetVoiceHandler::new(repo)
            .handle(GetVoice { voice_id: VoiceId::new(77) })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_default_does_not_fall_back() {
        let repo = catalog().await;
        let mark = repo.get_by_name("Mark").await.unwrap().unwrap();
        repo.mark_default(mark.id, "en", Gender::Male).await.unwrap();
        let handler = GetDefaultVoiceHandler::new(repo);

        let english = handler
            .handle(GetDefaultVoice { language: "en".to_string(), gender: Gender::Male })
            .await
            .unwrap();
        assert_eq!(english.map(|v| v.id), Some(mark.id));

        let spanish = handler
            .handle(GetDefaultVoice { language: "es".to_string(), gender: Gender::Male })
            .await
            .unwrap();
        assert!(spanish.is_none());
    }
}
