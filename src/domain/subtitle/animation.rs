//! 单词弹出动画（grow / vanish）

/// 入场动画最长时长（毫秒）
pub const MAX_GROW_MS: f64 = 200.0;
/// 入场动画占单词时长的最大比例
pub const GROW_RATIO: f64 = 0.3;
/// 退场动画在结束前多少毫秒开始
pub const VANISH_LEAD_MS: f64 = 200.0;
/// 退场动画最早开始于单词时长的比例
pub const VANISH_MIN_RATIO: f64 = 0.7;

/// 单个单词的动画时间窗（相对于单词起点，毫秒）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordAnimation {
    pub duration_ms: f64,
    pub grow_ms: f64,
    pub vanish_start_ms: f64,
}

impl WordAnimation {
    /// 根据单词时长（秒）计算动画时间窗
    pub fn for_duration(duration_secs: f64) -> Self {
        let duration_ms = duration_secs.max(0.0) * 1000.0;
        let grow_ms = MAX_GROW_MS.min(duration_ms * GROW_RATIO);
        let vanish_start_ms =
            (duration_ms - VANISH_LEAD_MS).max(duration_ms * VANISH_MIN_RATIO);

        Self {
            duration_ms,
            grow_ms,
            vanish_start_ms,
        }
    }

    /// 生成 ASS override 标签
    ///
    /// 入场：50% → 120%（grow 窗口内）→ 100%（回弹，持续 grow 的 20%）；
    /// 退场：从 vanish_start 到结束淡出至全透明并缩小到 70%。
    pub fn override_tags(&self) -> String {
        let grow = self.grow_ms;
        let settle = grow * 1.2;
        format!(
            "{{\\fscx50\\fscy50\\t(0,{grow:.0},\\fscx120\\fscy120)\\t({grow:.0},{settle:.0},\\fscx100\\fscy100)}}\
             {{\\t({vanish:.0},{end:.0},\\alpha&HFF&\\fscx70\\fscy70)}}",
            grow = grow,
            settle = settle,
            vanish = self.vanish_start_ms,
            end = self.duration_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_word_caps_grow_and_leads_vanish() {
        let anim = WordAnimation::for_duration(2.0);
        assert_eq!(anim.grow_ms, 200.0);
        assert_eq!(anim.vanish_start_ms, 1800.0);
        assert_eq!(anim.duration_ms, 2000.0);
    }

    #[test]
    fn test_short_word_uses_ratios() {
        let anim = WordAnimation::for_duration(0.4);
        assert!((anim.grow_ms - 120.0).abs() < 1e-9);
        assert!((anim.vanish_start_ms - 280.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_bounds_hold_across_durations() {
        for step in 0..500 {
            let secs = step as f64 * 0.013;
            let anim = WordAnimation::for_duration(secs);
            assert!(anim.grow_ms <= MAX_GROW_MS);
            assert!(anim.grow_ms <= anim.duration_ms * GROW_RATIO + 1e-9);
            assert!(anim.vanish_start_ms <= anim.duration_ms + 1e-9);
            assert!(anim.vanish_start_ms + 1e-9 >= anim.duration_ms * VANISH_MIN_RATIO);
        }
    }

    #[test]
    fn test_zero_duration() {
        let anim = WordAnimation::for_duration(0.0);
        assert_eq!(anim.grow_ms, 0.0);
        assert_eq!(anim.vanish_start_ms, 0.0);
    }

    #[test]
    fn test_override_tags_format() {
        let tags = WordAnimation::for_duration(1.0).override_tags();
        assert_eq!(
            tags,
            "{\\fscx50\\fscy50\\t(0,200,\\fscx120\\fscy120)\\t(200,240,\\fscx100\\fscy100)}\
             {\\t(800,1000,\\alpha&HFF&\\fscx70\\fscy70)}"
        );
    }
}
