//! Voice HTTP Handlers - 音色目录管理

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::{
    CreateVoice, DeactivateVoice, DeleteVoice, GetDefaultVoice, GetVoice, PromoteDefaultVoice,
    PromotionOutcome, UpdateVoice, VoiceChanges,
};
use crate::domain::voice::VoiceId;
use crate::infrastructure::http::dto::{
    parse_gender, ApiResponse, CreateVoiceRequest, DefaultVoiceRequest, Empty,
    SetDefaultVoiceRequest, UpdateVoiceRequest, VoiceIdRequest, VoiceResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 创建音色
pub async fn create_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateVoiceRequest>,
) -> Result<Json<ApiResponse<VoiceResponse>>, ApiError> {
    let catalog = state.catalog()?;

    let command = CreateVoice {
        name: req.name,
        language: req.language,
        gender: parse_gender(&req.gender)?,
        file_path: PathBuf::from(req.file_path),
        description: req.description,
        embedding_path: req.embedding_path.map(PathBuf::from),
        is_default: req.is_default,
        is_active: req.is_active,
        owner_id: req.owner_id,
    };

    let voice = catalog.create_voice_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(voice.into())))
}

/// 部分更新音色（不含默认标记）
pub async fn update_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateVoiceRequest>,
) -> Result<Json<ApiResponse<VoiceResponse>>, ApiError> {
    let catalog = state.catalog()?;

    let changes = VoiceChanges {
        name: req.name,
        description: req.description,
        language: req.language,
        gender: req.gender.as_deref().map(parse_gender).transpose()?,
        file_path: req.file_path.map(PathBuf::from),
        embedding_path: req.embedding_path.map(|p| p.map(PathBuf::from)),
        is_active: req.is_active,
        owner_id: req.owner_id,
    };

    if changes.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let voice = catalog
        .update_voice_handler
        .handle(UpdateVoice {
            voice_id: req.id,
            changes,
        })
        .await?;

    Ok(Json(ApiResponse::success(voice.into())))
}

/// 获取音色详情（含非活跃音色）
pub async fn get_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceIdRequest>,
) -> Result<Json<ApiResponse<VoiceResponse>>, ApiError> {
    let voice = state
        .catalog()?
        .get_voice_handler
        .handle(GetVoice { voice_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(voice.into())))
}

/// 停用音色
pub async fn deactivate_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceIdRequest>,
) -> Result<Json<ApiResponse<VoiceResponse>>, ApiError> {
    let voice = state
        .catalog()?
        .deactivate_voice_handler
        .handle(DeactivateVoice { voice_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(voice.into())))
}

/// 删除音色记录（样本文件保留）
pub async fn delete_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceIdRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .catalog()?
        .delete_voice_handler
        .handle(DeleteVoice { voice_id: req.id })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 设为 (语言, 性别) 的默认音色
pub async fn set_default_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetDefaultVoiceRequest>,
) -> Result<Json<ApiResponse<VoiceResponse>>, ApiError> {
    let command = PromoteDefaultVoice {
        voice_id: req.id,
        language: req.language,
        gender: parse_gender(&req.gender)?,
    };

    match state.catalog()?.promote_default_handler.handle(command).await? {
        PromotionOutcome::Promoted(voice) => Ok(Json(ApiResponse::success(voice.into()))),
        PromotionOutcome::Rejected => Err(ApiError::UnprocessableEntity(
            "Voice not eligible for this language/gender".to_string(),
        )),
    }
}

/// 获取 (语言, 性别) 当前默认音色，没有时 data 为 null
pub async fn get_default_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DefaultVoiceRequest>,
) -> Result<Json<ApiResponse<Option<VoiceResponse>>>, ApiError> {
    let query = GetDefaultVoice {
        language: req.language,
        gender: parse_gender(&req.gender)?,
    };

    let voice = state
        .catalog()?
        .get_default_voice_handler
        .handle(query)
        .await?;

    Ok(Json(ApiResponse::success(voice.map(VoiceResponse::from))))
}

/// 下载音色参考音频
pub async fn download_voice_audio(
    State(state): State<Arc<AppState>>,
    Path(voice_id): Path<i64>,
) -> Result<Response, ApiError> {
    let voice_id = VoiceId::new(voice_id);
    let voice = state
        .catalog()?
        .get_voice_handler
        .handle(GetVoice { voice_id })
        .await?;

    let audio_path = state.sample_path(&voice.file_path);
    let file = match tokio::fs::File::open(&audio_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!(
                "Voice audio file not found: {}",
                voice_id
            )));
        }
        Err(e) => {
            return Err(ApiError::Internal(format!("Failed to open audio file: {}", e)));
        }
    };

    let file_size = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get file metadata: {}", e)))?
        .len();

    let extension = audio_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "wav".to_string());

    let content_type = match extension.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        _ => "application/octet-stream",
    };

    tracing::debug!(
        voice_id = %voice_id,
        path = %audio_path.display(),
        size = file_size,
        "Streaming voice sample"
    );

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.{}\"", voice_id, extension),
        )
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
