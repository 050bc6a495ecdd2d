//! WAV Codec - 基于 symphonia 的 WAV 解码与 16 位 PCM 编码
//!
//! - TTS 服务返回的 WAV → 单声道 f32 样本
//! - 拼接后的 f32 样本 → WAV（作为 MP3 编码器的输入）

use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// WAV 编解码错误
#[derive(Debug, Error)]
pub enum WavError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// 解码后的单声道音频
#[derive(Debug, Clone)]
pub struct DecodedWav {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// 原始声道数（样本已下混为单声道）
    pub channels: u16,
}

/// 使用 symphonia 解码 WAV，多声道按帧取平均下混为单声道
pub fn decode_wav(data: &[u8]) -> Result<DecodedWav, WavError> {
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(WavError::InvalidInput(
            "missing RIFF/WAVE header".to_string(),
        ));
    }

    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("wav");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| WavError::DecodingError(format!("Probe failed: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| WavError::DecodingError("No audio track found".to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| WavError::DecodingError("Unknown sample rate".to_string()))?;

    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .ok_or_else(|| WavError::DecodingError("Unknown channel count".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| WavError::DecodingError(format!("Decoder creation failed: {}", e)))?;

    let track_id = track.id;
    let mut interleaved: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(WavError::DecodingError(format!(
                    "Packet read error: {}",
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("Decode error (skipping packet): {}", e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let actual_samples = num_frames * spec.channels.count();
        interleaved.extend(&sample_buf.samples()[..actual_samples]);
    }

    Ok(DecodedWav {
        samples: downmix(interleaved, channels),
        sample_rate,
        channels: channels as u16,
    })
}

fn downmix(interleaved: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved;
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// 将单声道 f32 样本编码为 16 位 PCM WAV
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, WavError> {
    if sample_rate == 0 {
        return Err(WavError::InvalidInput("sample rate cannot be 0".to_string()));
    }

    let bits_per_sample: u16 = 16;
    let num_channels: u16 = 1;
    let byte_rate = sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
    let block_align = num_channels * (bits_per_sample / 8);

    let data_size = samples.len() * 2;
    let file_size = 36 + data_size;
    if file_size > u32::MAX as usize {
        return Err(WavError::InvalidInput(format!(
            "audio too long for WAV container: {} samples",
            samples.len()
        )));
    }

    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());

    for &s in samples {
        let value = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        wav.extend_from_slice(&value.to_le_bytes());
    }

    Ok(wav)
}
