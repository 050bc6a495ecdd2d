//! FFmpeg Compositor - 背景视频循环 + ASS 字幕烧录 + 音频混流
//!
//! 实现 VideoCompositorPort：
//! - 字幕文档下载到临时文件（离开作用域即删除）
//! - ffprobe 读取音频时长，作为输出视频时长
//! - ffmpeg 输出分片 MP4 到 stdout（无需可回写的输出文件）

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

use super::process::{run_capture, ProcessError};
use super::scratch::scratch_file;
use crate::application::ports::{CompositeRequest, CompositorError, VideoCompositorPort};

/// 合成器配置
#[derive(Debug, Clone)]
pub struct FfmpegCompositorConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// 单次 ffmpeg / ffprobe 调用的超时时间（秒）
    pub encode_timeout_secs: u64,
    /// 字幕文档下载超时时间（秒）
    pub fetch_timeout_secs: u64,
    /// 缩略图截取位置（秒）
    pub thumbnail_offset_secs: f64,
    /// 字幕临时文件目录，缺省为系统临时目录
    pub scratch_dir: Option<PathBuf>,
}

impl Default for FfmpegCompositorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            encode_timeout_secs: 900,
            fetch_timeout_secs: 60,
            thumbnail_offset_secs: 1.0,
            scratch_dir: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeSection>,
    format: Option<ProbeSection>,
}

#[derive(Debug, Deserialize)]
struct ProbeSection {
    duration: Option<String>,
}

/// 从 ffprobe JSON 输出中取时长，音频流时长优先
fn parse_probe_duration(json: &[u8]) -> Result<f64, CompositorError> {
    let probe: ProbeOutput = serde_json::from_slice(json)
        .map_err(|e| CompositorError::ProbeFailed(format!("invalid ffprobe output: {}", e)))?;

    let duration = probe
        .streams
        .iter()
        .chain(probe.format.iter())
        .filter_map(|section| section.duration.as_deref())
        .filter_map(|raw| raw.trim().parse::<f64>().ok())
        .find(|d| d.is_finite() && *d > 0.0);

    if probe.streams.is_empty() {
        return Err(CompositorError::ProbeFailed(
            "no audio stream found".to_string(),
        ));
    }

    duration.ok_or_else(|| CompositorError::ProbeFailed("audio duration unavailable".to_string()))
}

fn escape_chars(raw: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 转义 `-filter_complex` 中作为滤镜选项值的路径
///
/// 两层转义：先按选项值转义，再按滤镜图转义
fn escape_filter_path(path: &Path) -> String {
    let option_value = escape_chars(&path.to_string_lossy(), &['\\', '\'', ':']);
    escape_chars(&option_value, &['\\', '\'', '[', ']', ',', ';'])
}

/// 秒数转 ffmpeg 时长参数
fn format_secs(secs: f64) -> String {
    format!("{:.3}", secs)
}

/// 构造合成参数
fn composite_args(
    background_url: &str,
    audio_url: &str,
    subtitle_path: &Path,
    duration_secs: f64,
) -> Vec<String> {
    let duration = format_secs(duration_secs);
    let filter = format!(
        "[0:v]trim=duration={},setpts=PTS-STARTPTS,ass={}[v]",
        duration,
        escape_filter_path(subtitle_path)
    );

    [
        "-hide_banner",
        "-loglevel",
        "error",
        "-stream_loop",
        "-1",
        "-i",
        background_url,
        "-i",
        audio_url,
        "-filter_complex",
        filter.as_str(),
        "-map",
        "[v]",
        "-map",
        "1:a",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-c:a",
        "aac",
        "-t",
        duration.as_str(),
        "-f",
        "mp4",
        "-movflags",
        "frag_keyframe+empty_moov",
        "pipe:1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// 构造缩略图参数
fn thumbnail_args(video_url: &str, offset_secs: f64) -> Vec<String> {
    let offset = format_secs(offset_secs);
    [
        "-hide_banner",
        "-loglevel",
        "error",
        "-ss",
        offset.as_str(),
        "-i",
        video_url,
        "-vframes",
        "1",
        "-f",
        "image2",
        "-c:v",
        "mjpeg",
        "pipe:1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn map_process_error(step: &'static str, err: ProcessError) -> CompositorError {
    match err {
        ProcessError::Failed { stderr, .. } => CompositorError::EncoderFailed { stderr },
        ProcessError::Timeout { secs, .. } => CompositorError::Timeout { step, secs },
        other => CompositorError::IoError(other.to_string()),
    }
}

/// FFmpeg 合成器
pub struct FfmpegCompositor {
    client: Client,
    config: FfmpegCompositorConfig,
}

impl FfmpegCompositor {
    pub fn new(config: FfmpegCompositorConfig) -> Result<Self, CompositorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| CompositorError::IoError(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn encode_timeout(&self) -> Duration {
        Duration::from_secs(self.config.encode_timeout_secs)
    }

    /// 下载字幕文档到临时文件
    async fn fetch_subtitle(&self, url: &str) -> Result<NamedTempFile, CompositorError> {
        let upstream = |message: String| CompositorError::UpstreamFetch {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream(format!("HTTP {}", status)));
        }

        let body = response.bytes().await.map_err(|e| upstream(e.to_string()))?;

        let mut file = scratch_file(self.config.scratch_dir.as_deref(), ".ass")
            .map_err(|e| CompositorError::IoError(format!("Failed to create temp file: {}", e)))?;
        file.write_all(&body)
            .and_then(|_| file.flush())
            .map_err(|e| CompositorError::IoError(format!("Failed to write subtitle: {}", e)))?;

        Ok(file)
    }

    /// ffprobe 读取音频时长（秒）
    async fn probe_audio_duration(&self, audio_url: &str) -> Result<f64, CompositorError> {
        let args: Vec<String> = [
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=duration:format=duration",
            "-of",
            "json",
            audio_url,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let output = run_capture(&self.config.ffprobe_path, &args, None, self.encode_timeout())
            .await
            .map_err(|e| match e {
                ProcessError::Timeout { secs, .. } => CompositorError::Timeout {
                    step: "ffprobe",
                    secs,
                },
                other => CompositorError::ProbeFailed(other.to_string()),
            })?;

        parse_probe_duration(&output)
    }
}

#[async_trait]
impl VideoCompositorPort for FfmpegCompositor {
    async fn composite(&self, request: &CompositeRequest) -> Result<Vec<u8>, CompositorError> {
        // 字幕临时文件随 `subtitle` 在任一返回路径上删除
        let subtitle = self.fetch_subtitle(&request.subtitle_url).await?;
        let duration = self.probe_audio_duration(&request.audio_url).await?;

        tracing::info!(
            background = %request.background_video_url,
            duration_secs = duration,
            "Compositing video"
        );

        let args = composite_args(
            &request.background_video_url,
            &request.audio_url,
            subtitle.path(),
            duration,
        );

        let video = run_capture(&self.config.ffmpeg_path, &args, None, self.encode_timeout())
            .await
            .map_err(|e| map_process_error("ffmpeg composite", e))?;

        if video.is_empty() {
            return Err(CompositorError::EncoderFailed {
                stderr: "ffmpeg produced no video output".to_string(),
            });
        }

        tracing::debug!(video_size = video.len(), "Video composited");
        Ok(video)
    }

    async fn extract_thumbnail(&self, video_url: &str) -> Result<Vec<u8>, CompositorError> {
        let args = thumbnail_args(video_url, self.config.thumbnail_offset_secs);

        let jpeg = run_capture(&self.config.ffmpeg_path, &args, None, self.encode_timeout())
            .await
            .map_err(|e| map_process_error("ffmpeg thumbnail", e))?;

        if jpeg.is_empty() {
            return Err(CompositorError::EncoderFailed {
                stderr: format!(
                    "no frame at {}s in {}",
                    self.config.thumbnail_offset_secs, video_url
                ),
            });
        }

        Ok(jpeg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::test_support::{CannedResponse, TestServer};

    #[test]
    fn test_parse_probe_prefers_stream_duration() {
        let json = br#"{"streams": [{"duration": "12.480000"}], "format": {"duration": "12.5"}}"#;
        assert_eq!(parse_probe_duration(json).unwrap(), 12.48);
    }

    #[test]
    fn test_parse_probe_falls_back_to_format_duration() {
        let json = br#"{"streams": [{"index": 0}], "format": {"duration": "3.2"}}"#;
        assert_eq!(parse_probe_duration(json).unwrap(), 3.2);
    }

    #[test]
    fn test_parse_probe_without_audio_stream() {
        let json = br#"{"streams": [], "format": {"duration": "3.2"}}"#;
        assert!(matches!(
            parse_probe_duration(json),
            Err(CompositorError::ProbeFailed(_))
        ));
    }

    #[test]
    fn test_composite_args() {
        let args = composite_args(
            "https://cdn/bg.mp4",
            "http://minio:9000/media/audio/a.mp3",
            Path::new("/tmp/sub.ass"),
            12.5,
        );
        let joined = args.join(" ");

        assert!(joined.starts_with("-hide_banner -loglevel error -stream_loop -1 -i https://cdn/bg.mp4"));
        assert!(args.contains(
            &"[0:v]trim=duration=12.500,setpts=PTS-STARTPTS,ass=/tmp/sub.ass[v]".to_string()
        ));
        assert!(joined.contains("-map [v] -map 1:a"));
        assert!(joined.contains("-t 12.500"));
        assert!(joined.ends_with("-movflags frag_keyframe+empty_moov pipe:1"));
    }

    #[test]
    fn test_thumbnail_args() {
        let args = thumbnail_args("http://minio/videos/a.mp4", 1.0);
        assert_eq!(
            args.join(" "),
            "-hide_banner -loglevel error -ss 1.000 -i http://minio/videos/a.mp4 \
             -vframes 1 -f image2 -c:v mjpeg pipe:1"
        );
    }

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(
            escape_filter_path(Path::new("C:\\tmp\\it's.ass")),
            r"C\\:\\\\tmp\\\\it\\\'s.ass"
        );
        assert_eq!(
            escape_filter_path(Path::new("/tmp/a:b,c.ass")),
            r"/tmp/a\\:b\,c.ass"
        );
        assert_eq!(escape_filter_path(Path::new("/tmp/abc.ass")), "/tmp/abc.ass");
    }

    #[test]
    fn test_encoder_failure_keeps_stderr() {
        let err = map_process_error(
            "ffmpeg composite",
            ProcessError::Failed {
                program: "ffmpeg".to_string(),
                code: Some(1),
                stderr: "Invalid data found when processing input".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "FFmpeg error: Invalid data found when processing input"
        );
    }

    #[tokio::test]
    async fn test_unreachable_subtitle_is_upstream_error() {
        let compositor = FfmpegCompositor::new(FfmpegCompositorConfig {
            fetch_timeout_secs: 5,
            ..Default::default()
        })
        .unwrap();
        let request = CompositeRequest {
            audio_url: "http://127.0.0.1:1/audio/a.mp3".to_string(),
            subtitle_url: "http://127.0.0.1:1/ass/a.ass".to_string(),
            background_video_url: "http://127.0.0.1:1/bg.mp4".to_string(),
        };
        assert!(matches!(
            compositor.composite(&request).await,
            Err(CompositorError::UpstreamFetch { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetched_subtitle_lands_in_scratch_dir() {
        let server = TestServer::start(|_| {
            CannedResponse::ok("text/plain", "[Script Info]\nScriptType: v4.00+\n")
        })
        .await;
        let scratch = tempfile::tempdir().unwrap();
        let compositor = FfmpegCompositor::new(FfmpegCompositorConfig {
            scratch_dir: Some(scratch.path().to_path_buf()),
            fetch_timeout_secs: 5,
            ..Default::default()
        })
        .unwrap();

        let file = compositor
            .fetch_subtitle(&server.url("/media/ass/a.ass"))
            .await
            .unwrap();
        let path = file.path().to_path_buf();
        assert!(path.starts_with(scratch.path()));
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with("[Script Info]"));

        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_subtitle_temp_file_removed_when_probe_fails() {
        let server = TestServer::start(|_| {
            CannedResponse::ok("text/plain", "[Script Info]\nScriptType: v4.00+\n")
        })
        .await;
        let scratch = tempfile::tempdir().unwrap();
        let compositor = FfmpegCompositor::new(FfmpegCompositorConfig {
            ffprobe_path: "/nonexistent/ffprobe".to_string(),
            scratch_dir: Some(scratch.path().to_path_buf()),
            fetch_timeout_secs: 5,
            ..Default::default()
        })
        .unwrap();
        let request = CompositeRequest {
            audio_url: server.url("/media/audio/a.mp3"),
            subtitle_url: server.url("/media/ass/a.ass"),
            background_video_url: server.url("/bg.mp4"),
        };

        let result = compositor.composite(&request).await;

        assert!(matches!(result, Err(CompositorError::ProbeFailed(_))));
        // 字幕已下载，失败返回后临时目录为空
        assert_eq!(server.hits(), 1);
        assert!(std::fs::read_dir(scratch.path()).unwrap().next().is_none());
    }
}
