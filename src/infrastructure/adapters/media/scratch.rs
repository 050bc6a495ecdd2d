//! 临时文件
//!
//! 下载的中间产物（字幕文档、待识别音频）落在这里，`NamedTempFile` 离开作用域即删除

use std::io;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// 在 `dir`（缺省为系统临时目录）下创建带后缀的临时文件
pub fn scratch_file(dir: Option<&Path>, suffix: &str) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix("narrate-").suffix(suffix);
    match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
}
