//! Synthesis Command Handlers - 语音合成

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::application::commands::SynthesizeSpeech;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ResolveVoice, SynthesisRequest, TtsEnginePort, TtsError, VoiceResolverPort,
};
use crate::domain::voice::{normalize_language, SpeechSpeed};

/// 合成得到的音频
#[derive(Debug, Clone)]
pub struct SynthesizedSpeech {
    pub synthesis_id: Uuid,
    pub audio_data: Vec<u8>,
    pub content_type: String,
    pub voice_sample: PathBuf,
}

/// 合成结果
#[derive(Debug, Clone)]
pub enum SynthesisOutcome {
    Audio(SynthesizedSpeech),
    /// 没有可用的音色（常规结果）
    NoVoice,
}

/// SynthesizeSpeech Handler
pub struct SynthesizeSpeechHandler {
    resolver: Arc<dyn VoiceResolverPort>,
    tts_engine: Arc<dyn TtsEnginePort>,
    timeout: Duration,
}

impl SynthesizeSpeechHandler {
    pub const DEFAULT_CONTENT_TYPE: &'static str = "audio/wav";

    pub fn new(
        resolver: Arc<dyn VoiceResolverPort>,
        tts_engine: Arc<dyn TtsEnginePort>,
        timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            tts_engine,
            timeout,
        }
    }

    pub async fn handle(
        &self,
        command: SynthesizeSpeech,
    ) -> Result<SynthesisOutcome, ApplicationError> {
        if command.text.trim().is_empty() {
            return Err(ApplicationError::validation("Text cannot be empty"));
        }
        let language = normalize_language(&command.language)?;
        let speed = SpeechSpeed::new(command.speed)?;
        let synthesis_id = Uuid::new_v4();

        tracing::info!(
            synthesis_id = %synthesis_id,
            text_len = command.text.chars().count(),
            language = %language,
            gender = %command.gender,
            voice_id = ?command.voice_id,
            voice_name = ?command.voice_name,
            speed = speed.value(),
            "Synthesizing speech"
        );

        let request = ResolveVoice {
            language: language.clone(),
            gender: command.gender,
            voice_id: command.voice_id,
            voice_name: command.voice_name,
        };

        let Some(sample_path) = self.resolver.resolve(&request).await? else {
            tracing::info!(
                synthesis_id = %synthesis_id,
                language = %language,
                gender = %command.gender,
                mode = self.resolver.mode(),
                "No voice available"
            );
            return Ok(SynthesisOutcome::NoVoice);
        };

        let voice_sample = tokio::fs::read(&sample_path).await.map_err(|e| {
            ApplicationError::StorageError(format!(
                "Failed to read voice sample {}: {}",
                sample_path.display(),
                e
            ))
        })?;

        let sample_file_name = sample_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "voice_sample.wav".to_string());

        let synthesis = self.tts_engine.synthesize(SynthesisRequest {
            text: command.text,
            language,
            speed: speed.value(),
            voice_sample,
            sample_file_name,
        });

        let audio = tokio::time::timeout(self.timeout, synthesis)
            .await
            .map_err(|_| ApplicationError::SynthesisFailed(TtsError::Timeout))??;

        tracing::info!(
            synthesis_id = %synthesis_id,
            sample = %sample_path.display(),
            audio_size = audio.audio_data.len(),
            "Speech synthesis completed"
        );

        Ok(SynthesisOutcome::Audio(SynthesizedSpeech {
            synthesis_id,
            audio_data: audio.audio_data,
            content_type: audio
                .content_type
                .unwrap_or_else(|| Self::DEFAULT_CONTENT_TYPE.to_string()),
            voice_sample: sample_path,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{NewVoice, VoiceRepositoryPort};
    use crate::application::resolver::CatalogVoiceResolver;
    use crate::domain::voice::{Gender, VoiceId};
    use crate::infrastructure::adapters::{FakeTtsClient, FakeTtsClientConfig};
    use crate::infrastructure::memory::InMemoryVoiceRepository;
    use tempfile::tempdir;

    fn command(language: &str, gender: Gender) -> SynthesizeSpeech {
        SynthesizeSpeech {
            text: "Hola mundo".to_string(),
            language: language.to_string(),
            gender,
            voice_id: None,
            voice_name: None,
            speed: 1.0,
        }
    }

    async fn setup(
        tts: FakeTtsClient,
    ) -> (tempfile::TempDir, Arc<FakeTtsClient>, SynthesizeSpeechHandler, VoiceId) {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("mark.wav"), b"mark-sample").unwrap();

        let repo = InMemoryVoiceRepository::new().arc();
        let mark = repo
            .create(NewVoice::new("Mark", "en", Gender::Male, "mark.wav"))
            .await
            .unwrap();
        repo.mark_default(mark.id, "en", Gender::Male).await.unwrap();

        let resolver = Arc::new(CatalogVoiceResolver::new(repo, dir.path()));
        let tts = Arc::new(tts);
        let handler = SynthesizeSpeechHandler::new(resolver, tts.clone(), Duration::from_secs(5));
        (dir, tts, handler, mark.id)
    }

    #[tokio::test]
    async fn test_synthesize_with_fallback_voice() {
        let (dir, tts, handler, _) = setup(FakeTtsClient::new(FakeTtsClientConfig::default())).await;

        let outcome = handler.handle(command("es", Gender::Male)).await.unwrap();
        let SynthesisOutcome::Audio(speech) = outcome else {
            panic!("expected audio");
        };
        assert_eq!(speech.audio_data, FakeTtsClientConfig::default().audio_data);
        assert_eq!(speech.voice_sample, dir.path().join("mark.wav"));

        let sent = tts.last_request().unwrap();
        assert_eq!(sent.language, "es");
        assert_eq!(sent.voice_sample, b"mark-sample");
        assert_eq!(sent.sample_file_name, "mark.wav");
    }

    #[tokio::test]
    async fn test_no_voice_is_not_an_error() {
        let (_dir, tts, handler, _) = setup(FakeTtsClient::new(FakeTtsClientConfig::default())).await;

        let outcome = handler.handle(command("es", Gender::Female)).await.unwrap();
        assert!(matches!(outcome, SynthesisOutcome::NoVoice));
        assert!(tts.last_request().is_none());
    }

    #[tokio::test]
    async fn test_explicit_missing_id_gives_no_voice() {
        let (_dir, _tts, handler, _) = setup(FakeTtsClient::new(FakeTtsClientConfig::default())).await;

        let mut cmd = command("en", Gender::Male);
        cmd.voice_id = Some(VoiceId::new(999));
        let outcome = handler.handle(cmd).await.unwrap();
        assert!(matches!(outcome, SynthesisOutcome::NoVoice));
    }

    #[tokio::test]
    async fn test_speed_and_text_validation() {
        let (_dir, _tts, handler, _) = setup(FakeTtsClient::new(FakeTtsClientConfig::default())).await;

        let mut cmd = command("en", Gender::Male);
        cmd.speed = 2.5;
        assert!(matches!(
            handler.handle(cmd).await,
            Err(ApplicationError::ValidationError(_))
        ));

        let mut cmd = command("en", Gender::Male);
        cmd.text = "   ".to_string();
        assert!(matches!(
            handler.handle(cmd).await,
            Err(ApplicationError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_propagated() {
        let config = FakeTtsClientConfig {
            failure: Some((502, "model not loaded".to_string())),
            ..Default::default()
        };
        let (_dir, _tts, handler, _) = setup(FakeTtsClient::new(config)).await;

        let err = handler.handle(command("en", Gender::Male)).await.unwrap_err();
        match err {
            ApplicationError::SynthesisFailed(TtsError::ServiceError { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "model not loaded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_engine_timeout() {
        let config = FakeTtsClientConfig {
            latency: Duration::from_millis(500),
            ..Default::default()
        };
        let (_dir, _tts, handler, _) = setup(FakeTtsClient::new(config)).await;
        let handler = SynthesizeSpeechHandler {
            timeout: Duration::from_millis(20),
            ..handler
        };

        let err = handler.handle(command("en", Gender::Male)).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::SynthesisFailed(TtsError::Timeout)
        ));
    }
}
