//! 转写结果值对象

use serde::{Deserialize, Serialize};

/// 带时间戳的单词
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    /// 起始时间（秒）
    pub start: f64,
    /// 结束时间（秒）
    pub end: f64,
    pub text: String,
}

impl WordTiming {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// 单词时长（秒），不会为负
    pub fn duration_secs(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// 转写结果
///
/// `degraded` 为 true 表示转写失败后降级为空结果，
/// 与"音频确实没有语音"区分开
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub words: Vec<WordTiming>,
    pub degraded: bool,
}

impl Transcript {
    pub fn new(words: Vec<WordTiming>) -> Self {
        Self {
            words: normalize_words(words),
            degraded: false,
        }
    }

    /// 转写失败时的降级结果
    pub fn degraded() -> Self {
        Self {
            words: Vec::new(),
            degraded: true,
        }
    }
}

/// 是否只包含标点或空白
fn is_blank_token(text: &str) -> bool {
    !text.chars().any(char::is_alphanumeric)
}

/// 规范化识别出的单词
///
/// - 去除首尾空白
/// - 丢弃纯标点/纯空白的 token 和非有限时间戳
/// - 保证 start <= end
/// - 按起始时间排序
pub fn normalize_words(words: Vec<WordTiming>) -> Vec<WordTiming> {
    let mut cleaned: Vec<WordTiming> = words
        .into_iter()
        .filter(|w| w.start.is_finite() && w.end.is_finite())
        .filter_map(|w| {
            let text = w.text.trim();
            if is_blank_token(text) {
                return None;
            }
            let start = w.start.max(0.0);
            Some(WordTiming {
                start,
                end: w.end.max(start),
                text: text.to_string(),
            })
        })
        .collect();

    cleaned.sort_by(|a, b| a.start.total_cmp(&b.start));
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_blank_and_punctuation_tokens() {
        let words = normalize_words(vec![
            WordTiming::new(0.0, 0.4, " Hello"),
            WordTiming::new(0.4, 0.5, " ,"),
            WordTiming::new(0.5, 0.6, "   "),
            WordTiming::new(0.6, 1.0, "world."),
        ]);

        let texts: Vec<_> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "world."]);
    }

    #[test]
    fn test_normalize_orders_and_fixes_inverted_ranges() {
        let words = normalize_words(vec![
            WordTiming::new(1.0, 0.8, "late"),
            WordTiming::new(0.2, 0.5, "early"),
        ]);

        assert_eq!(words[0].text, "early");
        assert_eq!(words[1].start, 1.0);
        assert_eq!(words[1].end, 1.0);
        assert!(words.iter().all(|w| w.start <= w.end));
    }

    #[test]
    fn test_normalize_drops_non_finite_timestamps() {
        let words = normalize_words(vec![WordTiming::new(f64::NAN, 1.0, "bad")]);
        assert!(words.is_empty());
    }

    #[test]
    fn test_degraded_transcript_is_empty() {
        let transcript = Transcript::degraded();
        assert!(transcript.words.is_empty());
        assert!(transcript.degraded);
        assert!(!Transcript::new(Vec::new()).degraded);
    }
}
