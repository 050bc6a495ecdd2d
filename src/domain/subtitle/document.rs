//! ASS (Advanced SubStation Alpha) 字幕文档生成
//!
//! 每个单词一条 Dialogue 事件，居中弹出，同一时刻只显示一个单词。

use std::fmt::Write;

use super::animation::WordAnimation;
use super::timecode::format_ass_time;
use crate::domain::transcript::WordTiming;

/// 画布尺寸（对应 PlayResX / PlayResY）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// 字幕样式
#[derive(Debug, Clone)]
pub struct SubtitleStyle {
    pub title: String,
    pub font_name: String,
    pub font_size: u32,
    /// ABGR 格式，如 &H00FFFFFF
    pub primary_color: String,
    pub secondary_color: String,
    pub outline_color: String,
    pub back_color: String,
    pub outline: u32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            title: "Animated Word Subtitles".to_string(),
            font_name: "Arial Black".to_string(),
            font_size: 72,
            primary_color: "&H00FFFFFF".to_string(),
            secondary_color: "&H000000FF".to_string(),
            outline_color: "&H00000000".to_string(),
            back_color: "&H80000000".to_string(),
            outline: 4,
        }
    }
}

/// 渲染好的字幕文档
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleDocument {
    content: String,
    event_count: usize,
}

impl SubtitleDocument {
    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn event_count(&self) -> usize {
        self.event_count
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.content.into_bytes()
    }
}

/// 单词文本中的花括号会开启 override 块，换行会打断事件行
fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '{' => '(',
            '}' => ')',
            '\r' | '\n' => ' ',
            other => other,
        })
        .collect()
}

fn write_header(out: &mut String, canvas: Canvas, style: &SubtitleStyle) {
    // String 写入不会失败
    let _ = write!(
        out,
        "[Script Info]\n\
         Title: {title}\n\
         ScriptType: v4.00+\n\
         WrapStyle: 0\n\
         ScaledBorderAndShadow: yes\n\
         YCbCr Matrix: TV.709\n\
         PlayResX: {width}\n\
         PlayResY: {height}\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Default,{font},{size},{primary},{secondary},{outline_color},{back},1,1,0,0,100,100,0,0,1,{outline},0,2,0,0,0,1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        title = style.title,
        width = canvas.width,
        height = canvas.height,
        font = style.font_name,
        size = style.font_size,
        primary = style.primary_color,
        secondary = style.secondary_color,
        outline_color = style.outline_color,
        back = style.back_color,
        outline = style.outline,
    );
}

/// 生成单个单词的 Dialogue 行
fn dialogue_line(word: &WordTiming, canvas: Canvas, style: &SubtitleStyle) -> String {
    let animation = WordAnimation::for_duration(word.duration_secs());
    format!(
        "Dialogue: 0,{start},{end},Default,,0,0,0,,{{\\an5\\pos({x},{y})\\bord{bord}\\shad0\\fs{fs}\\b1\\i1}}{tags}{text}",
        start = format_ass_time(word.start),
        end = format_ass_time(word.end),
        x = canvas.width / 2,
        y = canvas.height / 2,
        bord = style.outline,
        fs = style.font_size,
        tags = animation.override_tags(),
        text = sanitize_text(&word.text),
    )
}

/// 渲染字幕文档
pub fn render_document(
    words: &[WordTiming],
    canvas: Canvas,
    style: &SubtitleStyle,
) -> SubtitleDocument {
    let mut content = String::with_capacity(1024 + words.len() * 192);
    write_header(&mut content, canvas, style);

    for word in words {
        content.push_str(&dialogue_line(word, canvas, style));
        content.push('\n');
    }

    SubtitleDocument {
        content,
        event_count: words.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialogue_lines(doc: &SubtitleDocument) -> Vec<&str> {
        doc.as_str()
            .lines()
            .filter(|l| l.starts_with("Dialogue:"))
            .collect()
    }

    #[test]
    fn test_one_event_per_word() {
        let words = vec![
            WordTiming::new(0.0, 0.5, "Hello"),
            WordTiming::new(0.6, 1.2, "world"),
        ];
        let doc = render_document(&words, Canvas::default(), &SubtitleStyle::default());

        assert_eq!(doc.event_count(), 2);
        assert_eq!(dialogue_lines(&doc).len(), 2);
    }

    #[test]
    fn test_header_uses_canvas() {
        let canvas = Canvas {
            width: 1080,
            height: 1920,
        };
        let doc = render_document(&[], canvas, &SubtitleStyle::default());

        assert!(doc.as_str().starts_with("[Script Info]\n"));
        assert!(doc.as_str().contains("PlayResX: 1080\n"));
        assert!(doc.as_str().contains("PlayResY: 1920\n"));
        assert!(doc.as_str().contains(
            "Style: Default,Arial Black,72,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,1,1,0,0,100,100,0,0,1,4,0,2,0,0,0,1"
        ));
        assert!(doc.as_str().ends_with("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n"));
        assert_eq!(doc.event_count(), 0);
    }

    #[test]
    fn test_dialogue_line_is_centered_and_animated() {
        let words = vec![WordTiming::new(1.0, 2.0, "pop")];
        let doc = render_document(&words, Canvas::default(), &SubtitleStyle::default());
        let line = dialogue_lines(&doc)[0];

        assert!(line.starts_with("Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,"));
        assert!(line.contains("{\\an5\\pos(960,540)\\bord4\\shad0\\fs72\\b1\\i1}"));
        assert!(line.contains("\\t(0,200,\\fscx120\\fscy120)"));
        assert!(line.contains("\\t(800,1000,\\alpha&HFF&\\fscx70\\fscy70)"));
        assert!(line.ends_with("pop"));
    }

    #[test]
    fn test_braces_in_text_cannot_open_override_block() {
        let words = vec![WordTiming::new(0.0, 1.0, "{\\b0}evil")];
        let doc = render_document(&words, Canvas::default(), &SubtitleStyle::default());
        assert!(dialogue_lines(&doc)[0].ends_with("(\\b0)evil"));
    }
}
