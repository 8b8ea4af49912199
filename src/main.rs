//! VokaFlow - 语音合成音色目录服务
//!
//! - Domain: voice/
//! - Application: commands, queries, ports
//! - Infrastructure: http, persistence, adapters

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use vokaflow::application::TtsEnginePort;
use vokaflow::config::{load_config, print_config, AppConfig};
use vokaflow::infrastructure::adapters::{HttpTtsClient, HttpTtsClientConfig};
use vokaflow::infrastructure::http::{AppState, HttpServer, ServerConfig};
use vokaflow::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteVoiceRepository,
};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},vokaflow={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("VokaFlow - voice catalog service v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.voices_dir).await?;

    // 创建 HTTP TTS 引擎
    let tts_config =
        HttpTtsClientConfig::new(config.tts.url.clone()).with_timeout(config.tts.timeout_secs);
    let tts_engine = Arc::new(HttpTtsClient::new(tts_config)?);
    if !tts_engine.health_check().await {
        tracing::warn!(url = %config.tts.url, "TTS service is not reachable at startup");
    }
    let synthesis_timeout = Duration::from_secs(config.tts.timeout_secs);

    let state = if config.database.enabled {
        if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // 初始化数据库
        let db_config = DatabaseConfig {
            database_url: config.database.database_url(),
            max_connections: config.database.max_connections,
        };
        let pool = create_pool(&db_config).await?;
        run_migrations(&pool).await?;

        let voice_repo = Arc::new(SqliteVoiceRepository::new(pool));
        AppState::new(
            voice_repo,
            tts_engine,
            config.storage.voices_dir.clone(),
            synthesis_timeout,
        )
    } else {
        tracing::warn!(
            voices_dir = %config.storage.voices_dir.display(),
            "Database disabled, resolving voices from the directory layout"
        );
        AppState::degraded(tts_engine, config.storage.voices_dir.clone(), synthesis_timeout)
    };

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_size(config.storage.max_upload_size as usize);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
