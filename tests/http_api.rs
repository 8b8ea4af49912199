//! HTTP API 测试（内存存储 + Fake TTS）

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;
use vokaflow::infrastructure::adapters::{FakeTtsClient, FakeTtsClientConfig};
use vokaflow::infrastructure::http::{AppState, HttpServer, ServerConfig};
use vokaflow::infrastructure::memory::InMemoryVoiceRepository;

const FAKE_AUDIO: &[u8] = b"RIFF\0\0\0\0WAVEtest";

struct TestApp {
    samples: TempDir,
    router: Router,
}

struct TestResponse {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

fn fake_tts(failure: Option<(u16, String)>) -> Arc<FakeTtsClient> {
    Arc::new(FakeTtsClient::new(FakeTtsClientConfig {
        audio_data: FAKE_AUDIO.to_vec(),
        failure,
        ..Default::default()
    }))
}

fn catalog_app_with(tts: Arc<FakeTtsClient>) -> TestApp {
    let samples = tempfile::tempdir().unwrap();
    let state = AppState::new(
        InMemoryVoiceRepository::new().arc(),
        tts,
        samples.path(),
        Duration::from_secs(5),
    );
    let router = HttpServer::new(ServerConfig::default(), state).router();
    TestApp { samples, router }
}

fn catalog_app() -> TestApp {
    catalog_app_with(fake_tts(None))
}

fn directory_app() -> TestApp {
    let samples = tempfile::tempdir().unwrap();
    let state = AppState::degraded(fake_tts(None), samples.path(), Duration::from_secs(5));
    let router = HttpServer::new(ServerConfig::default(), state).router();
    TestApp { samples, router }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    /// 写入样本文件并创建音色，返回 id
    async fn create_voice(&self, name: &str, language: &str, gender: &str) -> i64 {
        let file_name = format!("{}.wav", name.to_lowercase());
        tokio::fs::write(self.samples.path().join(&file_name), b"sample-bytes")
            .await
            .unwrap();

        let response = self
            .post(
                "/api/voice/create",
                json!({
                    "name": name,
                    "language": language,
                    "gender": gender,
                    "file_path": file_name,
                }),
            )
            .await
            .json();
        assert_eq!(response["errno"], 0, "create failed: {}", response);
        response["data"]["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn ping_reports_resolution_mode() {
    let response = catalog_app().get("/api/ping").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ok");
    assert_eq!(response.json()["mode"], "catalog");

    assert_eq!(directory_app().get("/api/ping").await.json()["mode"], "directory");
}

#[tokio::test]
async fn create_voice_validates_and_rejects_duplicates() {
    let app = catalog_app();
    let id = app.create_voice("Rachel", "en", "female").await;
    assert_eq!(id, 1);

    let duplicate = app
        .post(
            "/api/voice/create",
            json!({"name": "Rachel", "gender": "female", "file_path": "other.wav"}),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::OK);
    assert_eq!(duplicate.json()["errno"], 409);
    assert!(duplicate.json()["data"].is_null());

    let bad_gender = app
        .post(
            "/api/voice/create",
            json!({"name": "Robo", "gender": "robot", "file_path": "robo.wav"}),
        )
        .await;
    assert_eq!(bad_gender.json()["errno"], 400);

    let empty_path = app
        .post(
            "/api/voice/create",
            json!({"name": "Nobody", "gender": "male", "file_path": ""}),
        )
        .await;
    assert_eq!(empty_path.json()["errno"], 400);
}

#[tokio::test]
async fn synthesize_with_default_voice_returns_wav() {
    let app = catalog_app();
    let id = app.create_voice("Rachel", "en", "female").await;

    let promoted = app
        .post(
            "/api/voice/set_default",
            json!({"id": id, "language": "en", "gender": "female"}),
        )
        .await
        .json();
    assert_eq!(promoted["errno"], 0);
    assert_eq!(promoted["data"]["is_default"], true);

    // language 默认 en，gender 默认 female
    let response = app
        .post("/api/tts/synthesize", json!({"text": "Hello world"}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=synthesized_speech.wav"
    );
    assert!(response.headers.contains_key("x-synthesis-id"));
    assert_eq!(response.body, FAKE_AUDIO);
}

#[tokio::test]
async fn synthesize_falls_back_to_english_default() {
    let app = catalog_app();
    let id = app.create_voice("Mark", "en", "male").await;
    app.post(
        "/api/voice/set_default",
        json!({"id": id, "language": "en", "gender": "male"}),
    )
    .await;

    let response = app
        .post(
            "/api/tts/synthesize",
            json!({"text": "Hola", "language": "es", "gender": "male", "speed": 1.5}),
        )
        .await;
    assert_eq!(response.body, FAKE_AUDIO);
}

#[tokio::test]
async fn synthesize_reports_no_voice_and_bad_input() {
    let app = catalog_app();

    let no_voice = app
        .post("/api/tts/synthesize", json!({"text": "Hello"}))
        .await;
    assert_eq!(no_voice.status, StatusCode::OK);
    assert_eq!(no_voice.json()["errno"], 404);

    // 显式 id 不存在时不回退到默认音色
    let id = app.create_voice("Rachel", "en", "female").await;
    app.post(
        "/api/voice/set_default",
        json!({"id": id, "language": "en", "gender": "female"}),
    )
    .await;
    let unknown_id = app
        .post("/api/tts/synthesize", json!({"text": "Hello", "voice_id": 999}))
        .await;
    assert_eq!(unknown_id.json()["errno"], 404);

    let too_fast = app
        .post("/api/tts/synthesize", json!({"text": "Hello", "speed": 3.0}))
        .await;
    assert_eq!(too_fast.json()["errno"], 400);

    let empty_text = app
        .post("/api/tts/synthesize", json!({"text": "   "}))
        .await;
    assert_eq!(empty_text.json()["errno"], 400);

    let bad_gender = app
        .post("/api/tts/synthesize", json!({"text": "Hello", "gender": "robot"}))
        .await;
    assert_eq!(bad_gender.json()["errno"], 400);
}

#[tokio::test]
async fn synthesis_failure_is_service_unavailable() {
    let app = catalog_app_with(fake_tts(Some((500, "model crashed".to_string()))));
    let id = app.create_voice("Rachel", "en", "female").await;

    let response = app
        .post("/api/tts/synthesize", json!({"text": "Hello", "voice_id": id}))
        .await
        .json();
    assert_eq!(response["errno"], 503);
    assert!(response["error"].as_str().unwrap().contains("model crashed"));
}

#[tokio::test]
async fn rejected_promotion_is_unprocessable_and_clears_default() {
    let app = catalog_app();
    let rachel = app.create_voice("Rachel", "en", "female").await;
    let mark = app.create_voice("Mark", "en", "male").await;
    app.post(
        "/api/voice/set_default",
        json!({"id": rachel, "language": "en", "gender": "female"}),
    )
    .await;

    let rejected = app
        .post(
            "/api/voice/set_default",
            json!({"id": mark, "language": "en", "gender": "female"}),
        )
        .await
        .json();
    assert_eq!(rejected["errno"], 422);

    let current = app
        .post("/api/voice/default", json!({"language": "en", "gender": "female"}))
        .await
        .json();
    assert_eq!(current["errno"], 0);
    assert!(current["data"].is_null());
}

#[tokio::test]
async fn list_voices_filters_active_voices() {
    let app = catalog_app();
    let rachel = app.create_voice("Rachel", "en", "female").await;
    app.create_voice("Mark", "en", "male").await;
    let carmen = app.create_voice("Carmen", "es", "female").await;
    app.post(
        "/api/voice/set_default",
        json!({"id": rachel, "language": "en", "gender": "female"}),
    )
    .await;
    app.post("/api/voice/deactivate", json!({"id": carmen})).await;

    let all = app.get("/api/tts/voices").await.json();
    assert_eq!(all["data"]["voices"].as_array().unwrap().len(), 2);

    let female = app.get("/api/tts/voices?language=en&gender=FEMALE").await.json();
    let voices = female["data"]["voices"].as_array().unwrap();
    assert_eq!(voices.len(), 1);
    assert_eq!(
        voices[0],
        json!({
            "id": rachel,
            "name": "Rachel",
            "language": "en",
            "gender": "female",
            "description": null,
            "is_default": true,
        })
    );

    let bad = app.get("/api/tts/voices?gender=robot").await.json();
    assert_eq!(bad["errno"], 400);
}

#[tokio::test]
async fn update_get_and_delete_voice() {
    let app = catalog_app();
    let id = app.create_voice("Mark", "en", "male").await;

    let updated = app
        .post(
            "/api/voice/update",
            json!({"id": id, "description": "Narrator", "owner_id": 7}),
        )
        .await
        .json();
    assert_eq!(updated["data"]["description"], "Narrator");
    assert_eq!(updated["data"]["owner_id"], 7);

    let cleared = app
        .post("/api/voice/update", json!({"id": id, "description": null}))
        .await
        .json();
    assert!(cleared["data"]["description"].is_null());
    assert_eq!(cleared["data"]["owner_id"], 7);

    let nothing = app.post("/api/voice/update", json!({"id": id})).await.json();
    assert_eq!(nothing["errno"], 400);

    let fetched = app.post("/api/voice/get", json!({"id": id})).await.json();
    assert_eq!(fetched["data"]["name"], "Mark");
    assert_eq!(fetched["data"]["is_active"], true);

    let deleted = app.post("/api/voice/delete", json!({"id": id})).await.json();
    assert_eq!(deleted["errno"], 0);

    let missing = app.post("/api/voice/get", json!({"id": id})).await.json();
    assert_eq!(missing["errno"], 404);
    let missing = app.post("/api/voice/delete", json!({"id": id})).await.json();
    assert_eq!(missing["errno"], 404);
}

#[tokio::test]
async fn download_streams_reference_sample() {
    let app = catalog_app();
    let id = app.create_voice("Rachel", "en", "female").await;

    let response = app.get(&format!("/api/voice/audio/{}", id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(response.body, b"sample-bytes");

    let missing = app.get("/api/voice/audio/42").await.json();
    assert_eq!(missing["errno"], 404);
}

#[tokio::test]
async fn directory_mode_synthesizes_without_catalog() {
    let app = directory_app();

    let unavailable = app
        .post(
            "/api/voice/create",
            json!({"name": "Rachel", "gender": "female", "file_path": "r.wav"}),
        )
        .await
        .json();
    assert_eq!(unavailable["errno"], 503);
    assert_eq!(app.get("/api/tts/voices").await.json()["errno"], 503);

    let no_voice = app
        .post("/api/tts/synthesize", json!({"text": "Hallo", "language": "de"}))
        .await
        .json();
    assert_eq!(no_voice["errno"], 404);

    let dir = app.samples.path().join("en").join("female");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join("speaker.wav"), b"sample").await.unwrap();

    let response = app
        .post("/api/tts/synthesize", json!({"text": "Hallo", "language": "de"}))
        .await;
    assert_eq!(response.headers[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(response.body, FAKE_AUDIO);
}

#[tokio::test]
async fn directory_mode_rejects_path_like_language() {
    let app = directory_app();
    let dir = app.samples.path().join("en").join("female");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join("speaker.wav"), b"sample").await.unwrap();

    for language in ["../private", "en/../en", "..\\private"] {
        let response = app
            .post("/api/tts/synthesize", json!({"text": "Hallo", "language": language}))
            .await
            .json();
        assert_eq!(response["errno"], 400, "language {:?} was accepted", language);
    }
}

#[tokio::test]
async fn voice_name_is_matched_exactly() {
    let app = catalog_app();
    app.create_voice("Rachel", "en", "female").await;

    let padded = app
        .post(
            "/api/tts/synthesize",
            json!({"text": "Hello", "voice_name": "  Rachel "}),
        )
        .await
        .json();
    assert_eq!(padded["errno"], 404);

    let exact = app
        .post("/api/tts/synthesize", json!({"text": "Hello", "voice_name": "Rachel"}))
        .await;
    assert_eq!(exact.body, FAKE_AUDIO);
}
