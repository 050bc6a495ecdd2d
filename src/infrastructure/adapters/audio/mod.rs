//! Audio Adapter - WAV 编解码与 MP3 编码

mod mp3_encoder;
mod wav_codec;

pub use mp3_encoder::{FfmpegMp3Encoder, Mp3EncoderConfig};
pub use wav_codec::{decode_wav, encode_wav, DecodedWav, WavError};
