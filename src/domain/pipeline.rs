//! 生成流水线状态机
//!
//! Received → Authorized → AudioReady → TranscriptReady → SubtitleReady
//! → VideoReady → ThumbnailReady → Responded
//!
//! 终止状态：Rejected（鉴权失败）、Failed（任一步骤失败）、Responded

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Authorized,
    AudioReady,
    TranscriptReady,
    SubtitleReady,
    VideoReady,
    ThumbnailReady,
    Responded,
    Rejected,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Authorized => "authorized",
            PipelineStage::AudioReady => "audio_ready",
            PipelineStage::TranscriptReady => "transcript_ready",
            PipelineStage::SubtitleReady => "subtitle_ready",
            PipelineStage::VideoReady => "video_ready",
            PipelineStage::ThumbnailReady => "thumbnail_ready",
            PipelineStage::Responded => "responded",
            PipelineStage::Rejected => "rejected",
            PipelineStage::Failed => "failed",
        }
    }

    /// 成功路径上的下一个状态
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Received => Some(PipelineStage::Authorized),
            PipelineStage::Authorized => Some(PipelineStage::AudioReady),
            PipelineStage::AudioReady => Some(PipelineStage::TranscriptReady),
            PipelineStage::TranscriptReady => Some(PipelineStage::SubtitleReady),
            PipelineStage::SubtitleReady => Some(PipelineStage::VideoReady),
            PipelineStage::VideoReady => Some(PipelineStage::ThumbnailReady),
            PipelineStage::ThumbnailReady => Some(PipelineStage::Responded),
            PipelineStage::Responded | PipelineStage::Rejected | PipelineStage::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStage::Responded | PipelineStage::Rejected | PipelineStage::Failed
        )
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid pipeline transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: PipelineStage,
    pub to: PipelineStage,
}

/// 单个请求的流水线进度，只能严格顺序前进
#[derive(Debug, Clone)]
pub struct PipelineProgress {
    stage: PipelineStage,
}

impl Default for PipelineProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineProgress {
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::Received,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// 前进到下一个状态，`to` 必须恰好是当前状态的后继
    pub fn advance(&mut self, to: PipelineStage) -> Result<(), TransitionError> {
        if self.stage.next() != Some(to) {
            return Err(TransitionError {
                from: self.stage,
                to,
            });
        }
        tracing::debug!(from = %self.stage, to = %to, "Pipeline advanced");
        self.stage = to;
        Ok(())
    }

    /// 鉴权失败，只能发生在 Received
    pub fn reject(&mut self) -> Result<(), TransitionError> {
        if self.stage != PipelineStage::Received {
            return Err(TransitionError {
                from: self.stage,
                to: PipelineStage::Rejected,
            });
        }
        self.stage = PipelineStage::Rejected;
        Ok(())
    }

    /// 进入 Failed，返回失败时所处的状态
    pub fn fail(&mut self) -> PipelineStage {
        let failed_at = self.stage;
        if !self.stage.is_terminal() {
            self.stage = PipelineStage::Failed;
        }
        failed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authorized() -> PipelineProgress {
        let mut progress = PipelineProgress::new();
        progress.advance(PipelineStage::Authorized).unwrap();
        progress
    }

    #[test]
    fn test_happy_path_walks_every_stage() {
        let mut progress = PipelineProgress::new();
        let mut stage = progress.stage();
        while let Some(next) = stage.next() {
            progress.advance(next).unwrap();
            stage = next;
        }
        assert_eq!(progress.stage(), PipelineStage::Responded);
        assert!(progress.stage().is_terminal());
    }

    #[test]
    fn test_cannot_skip_stages() {
        let mut progress = authorized();
        let err = progress.advance(PipelineStage::VideoReady).unwrap_err();
        assert_eq!(err.from, PipelineStage::Authorized);
        assert_eq!(progress.stage(), PipelineStage::Authorized);
    }

    #[test]
    fn test_reject_only_from_received() {
        let mut progress = PipelineProgress::new();
        progress.reject().unwrap();
        assert_eq!(progress.stage(), PipelineStage::Rejected);

        let mut progress = authorized();
        assert!(progress.reject().is_err());
    }

    #[test]
    fn test_fail_is_terminal() {
        let mut progress = authorized();
        progress.advance(PipelineStage::AudioReady).unwrap();
        assert_eq!(progress.fail(), PipelineStage::AudioReady);
        assert_eq!(progress.stage(), PipelineStage::Failed);
        assert!(progress.advance(PipelineStage::TranscriptReady).is_err());
    }
}
