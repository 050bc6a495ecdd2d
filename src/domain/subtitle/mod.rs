//! Subtitle - 逐词动画字幕

mod animation;
mod document;
mod timecode;

pub use animation::WordAnimation;
pub use document::{render_document, Canvas, SubtitleDocument, SubtitleStyle};
pub use timecode::format_ass_time;
