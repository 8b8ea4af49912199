//! TTS Handlers - 语音合成与可用音色列表

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::application::{ListVoices, SynthesisOutcome, SynthesizeSpeech};
use crate::infrastructure::http::dto::{
    parse_gender, ApiResponse, ListVoicesParams, SynthesizeRequest, VoiceListResponse,
    VoiceSummary,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub const SYNTHESIS_ID_HEADER: &str = "x-synthesis-id";
const SYNTHESIZED_FILE_NAME: &str = "synthesized_speech.wav";

/// 语音合成
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Response, ApiError> {
    let command = SynthesizeSpeech {
        text: req.text,
        language: req.language,
        gender: parse_gender(&req.gender)?,
        voice_id: req.voice_id,
        voice_name: req.voice_name,
        speed: req.speed,
    };

    let speech = match state.synthesize_handler.handle(command).await? {
        SynthesisOutcome::Audio(speech) => speech,
        SynthesisOutcome::NoVoice => {
            return Err(ApiError::NotFound(
                "No voice available for the requested parameters".to_string(),
            ));
        }
    };

    let content_type = HeaderValue::from_str(&speech.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("audio/wav"));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, speech.audio_data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", SYNTHESIZED_FILE_NAME),
        )
        .header(SYNTHESIS_ID_HEADER, speech.synthesis_id.to_string())
        .body(Body::from(speech.audio_data))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// 可用音色列表（仅活跃音色）
pub async fn list_available_voices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListVoicesParams>,
) -> Result<Json<ApiResponse<VoiceListResponse>>, ApiError> {
    let catalog = state.catalog()?;

    let gender = params
        .gender
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .map(parse_gender)
        .transpose()?;
    let language = params
        .language
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());

    let voices = catalog
        .list_voices_handler
        .handle(ListVoices { language, gender })
        .await?;

    Ok(Json(ApiResponse::success(VoiceListResponse {
        voices: voices.into_iter().map(VoiceSummary::from).collect(),
    })))
}
