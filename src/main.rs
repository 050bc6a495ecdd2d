//! Narrate - 文本生成解说短视频服务
//!
//! 启动时构建所有适配器（只构建一次），注入 GenerateVideoHandler 后启动 HTTP 服务

use std::sync::Arc;

use narrate::application::{
    GenerateVideoHandler, ObjectStoragePort, PipelineOptions, TtsEnginePort,
};
use narrate::config::{load_config, print_config, AppConfig, StorageBackend, TtsBackend};
use narrate::domain::{Canvas, SubtitleStyle};
use narrate::infrastructure::adapters::{
    FakeTtsClient, FfmpegCompositor, FfmpegCompositorConfig, FfmpegMp3Encoder, HttpTranscriber,
    HttpTranscriberConfig, HttpTtsClient, HttpTtsClientConfig, MemoryObjectStorage,
    Mp3EncoderConfig, S3ObjectStorage, S3StorageConfig,
};
use narrate::infrastructure::http::{AppState, HttpServer};

/// 初始化日志，RUST_LOG 优先于配置
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},narrate={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_tts_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn TtsEnginePort>> {
    Ok(match config.tts.backend {
        TtsBackend::Http => {
            let tts_config = HttpTtsClientConfig::new(&config.tts.url)
                .with_model(&config.tts.model)
                .with_timeout(config.tts.timeout_secs);
            Arc::new(HttpTtsClient::new(tts_config)?)
        }
        TtsBackend::Fake => {
            tracing::warn!("Using fake TTS engine, output audio is silent");
            Arc::new(FakeTtsClient::with_defaults())
        }
    })
}

fn build_storage(config: &AppConfig) -> anyhow::Result<Arc<dyn ObjectStoragePort>> {
    let storage = &config.storage;
    Ok(match storage.backend {
        StorageBackend::S3 => Arc::new(S3ObjectStorage::new(S3StorageConfig {
            endpoint: storage.endpoint_url(),
            access_key: storage.access_key.clone(),
            secret_key: storage.secret_key.clone(),
            bucket: storage.bucket.clone(),
            region: storage.region.clone(),
            public_base_url: storage.public_base_url(),
        })?),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory object storage, artifacts are not persisted");
            Arc::new(MemoryObjectStorage::new(
                storage.public_base_url(),
                storage.bucket.clone(),
            ))
        }
    })
}

fn build_handler(config: &AppConfig) -> anyhow::Result<GenerateVideoHandler> {
    let tts_engine = build_tts_engine(config)?;

    let audio_encoder = Arc::new(FfmpegMp3Encoder::new(Mp3EncoderConfig {
        ffmpeg_path: config.media.ffmpeg_path.clone(),
        bitrate: config.media.mp3_bitrate.clone(),
        timeout_secs: config.media.encode_timeout_secs,
    }));

    let transcriber = Arc::new(HttpTranscriber::new(HttpTranscriberConfig {
        base_url: config.transcriber.url.clone(),
        model: config.transcriber.model.clone(),
        language: config.transcriber.language.clone(),
        timeout_secs: config.transcriber.timeout_secs,
        fetch_timeout_secs: config.media.fetch_timeout_secs,
        scratch_dir: config.media.scratch_dir.clone(),
    })?);

    let compositor = Arc::new(FfmpegCompositor::new(FfmpegCompositorConfig {
        ffmpeg_path: config.media.ffmpeg_path.clone(),
        ffprobe_path: config.media.ffprobe_path.clone(),
        encode_timeout_secs: config.media.encode_timeout_secs,
        fetch_timeout_secs: config.media.fetch_timeout_secs,
        thumbnail_offset_secs: config.media.thumbnail_offset_secs,
        scratch_dir: config.media.scratch_dir.clone(),
    })?);

    let storage = build_storage(config)?;

    let options = PipelineOptions {
        canvas: Canvas {
            width: config.subtitle.width,
            height: config.subtitle.height,
        },
        style: SubtitleStyle {
            font_name: config.subtitle.font_name.clone(),
            font_size: config.subtitle.font_size,
            ..Default::default()
        },
        rollback_on_failure: config.pipeline.rollback_on_failure,
    };

    Ok(GenerateVideoHandler::new(
        tts_engine,
        audio_encoder,
        transcriber,
        compositor,
        storage,
        options,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：旧环境变量 > 环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Narrate - 文本生成解说短视频服务");
    print_config(&config);

    let handler = build_handler(&config)?;
    let state = AppState::new(config.auth.access_token.clone(), handler);
    let server = HttpServer::new(config.server.clone(), state);

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
