//! 合成音频值对象

use thiserror::Error;

/// 句段拼接错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeechError {
    #[error("Sample rate mismatch: segment {segment} is {found} Hz, expected {expected} Hz")]
    SampleRateMismatch {
        segment: usize,
        expected: u32,
        found: u32,
    },
}

/// 单个句段的合成结果
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// 整段文本的合成音频（单声道 f32 PCM）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesizedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SynthesizedAudio {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 时长（秒）
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// 按顺序拼接句段音频
    ///
    /// 空句段（无样本）被跳过。所有非空句段必须使用同一采样率，
    /// 不一致时直接失败而不是沿用最后一个句段的采样率。
    pub fn concat(segments: Vec<SegmentAudio>) -> Result<Self, SpeechError> {
        let mut result = SynthesizedAudio::default();

        for (index, segment) in segments.into_iter().enumerate() {
            if segment.samples.is_empty() {
                continue;
            }

            if result.sample_rate == 0 {
                result.sample_rate = segment.sample_rate;
            } else if segment.sample_rate != result.sample_rate {
                return Err(SpeechError::SampleRateMismatch {
                    segment: index,
                    expected: result.sample_rate,
                    found: segment.sample_rate,
                });
            }

            result.samples.extend(segment.samples);
        }

        Ok(result)
    }
}
