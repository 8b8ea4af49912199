//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                  GET   健康检查
//! - /api/tts/synthesize        POST  语音合成，返回音频
//! - /api/tts/voices            GET   可用音色列表（?language=&gender=）
//! - /api/voice/create          POST  创建音色
//! - /api/voice/update          POST  部分更新音色
//! - /api/voice/get             POST  获取音色详情
//! - /api/voice/deactivate      POST  停用音色
//! - /api/voice/delete          POST  删除音色
//! - /api/voice/set_default     POST  设为默认音色
//! - /api/voice/default         POST  获取当前默认音色
//! - /api/voice/audio/:voice_id GET   下载参考音频

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/tts", tts_routes())
        .nest("/voice", voice_routes())
}

/// TTS 路由
fn tts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/synthesize", post(handlers::synthesize))
        .route("/voices", get(handlers::list_available_voices))
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_voice))
        .route("/update", post(handlers::update_voice))
        .route("/get", post(handlers::get_voice))
        .route("/deactivate", post(handlers::deactivate_voice))
        .route("/delete", post(handlers::delete_voice))
        .route("/set_default", post(handlers::set_default_voice))
        .route("/default", post(handlers::get_default_voice))
        .route("/audio/:voice_id", get(handlers::download_voice_audio))
}
