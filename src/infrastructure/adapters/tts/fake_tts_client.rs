//! Fake TTS Client - 用于测试的 TTS 客户端
//!
//! 返回固定的音频数据（或固定的失败），并记录最近一次请求，不实际调用 TTS 服务

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{SynthesisRequest, SynthesizedAudio, TtsEnginePort, TtsError};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 固定返回的音频数据
    pub audio_data: Vec<u8>,
    /// 设置后始终返回该 (HTTP 状态码, 错误信息)
    pub failure: Option<(u16, String)>,
    /// 模拟推理延迟
    pub latency: Duration,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            audio_data: b"RIFF\0\0\0\0WAVEfake".to_vec(),
            failure: None,
            latency: Duration::ZERO,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    last_request: Mutex<Option<SynthesisRequest>>,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        Self {
            config,
            last_request: Mutex::new(None),
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }

    /// 最近一次收到的请求
    pub fn last_request(&self) -> Option<SynthesisRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesizedAudio, TtsError> {
        tracing::debug!(
            text_len = request.text.len(),
            language = %request.language,
            sample = %request.sample_file_name,
            "FakeTtsClient: returning fixed audio"
        );

        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request);
        }

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        if let Some((status, message)) = &self.config.failure {
            return Err(TtsError::ServiceError {
                status: *status,
                message: message.clone(),
            });
        }

        Ok(SynthesizedAudio {
            audio_data: self.config.audio_data.clone(),
            content_type: Some("audio/wav".to_string()),
        })
    }

    async fn health_check(&self) -> bool {
        self.config.failure.is_none()
    }
}
