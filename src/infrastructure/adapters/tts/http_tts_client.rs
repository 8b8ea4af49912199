//! HTTP TTS Client - 调用外部语音合成 HTTP 服务
//!
//! 实现 TtsEnginePort trait，通过 HTTP 调用外部合成引擎
//!
//! 外部 TTS API:
//! POST {base_url}/synthesize
//! Request: multipart/form-data，字段 text / language / speed，文件 voice_sample
//! Response: 2xx 时 body 为原始音频，其余状态码视为失败

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client};
use std::time::Duration;

use crate::application::ports::{SynthesisRequest, SynthesizedAudio, TtsEnginePort, TtsError};

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
///
/// 失败不重试
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取合成 URL
    fn synthesize_url(&self) -> String {
        format!("{}/synthesize", self.config.base_url.trim_end_matches('/'))
    }

    /// 获取健康检查 URL
    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }

    fn build_form(request: SynthesisRequest) -> Result<Form, TtsError> {
        let sample = Part::bytes(request.voice_sample)
            .file_name(request.sample_file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Form::new()
            .text("text", request.text)
            .text("language", request.language)
            .text("speed", request.speed.to_string())
            .part("voice_sample", sample))
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesizedAudio, TtsError> {
        tracing::debug!(
            url = %self.synthesize_url(),
            text_len = request.text.len(),
            language = %request.language,
            speed = request.speed,
            sample_size = request.voice_sample.len(),
            "Sending TTS synthesize request"
        );

        let form = Self::build_form(request)?;

        let response = self
            .client
            .post(self.synthesize_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), error = %message, "TTS service error");
            return Err(TtsError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else {
                    TtsError::InvalidResponse(format!("Failed to read audio: {}", e))
                }
            })?
            .to_vec();

        tracing::info!(
            audio_size = audio_data.len(),
            content_type = ?content_type,
            "TTS synthesis completed"
        );

        Ok(SynthesizedAudio {
            audio_data,
            content_type,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
