//! 文本分割器
//!
//! 将输入文本按句末标点拆分为独立合成的句段

/// 检查是否为句末标点（后跟空白时分割）
#[inline]
fn is_terminal_punctuation(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

/// 按句末标点分割文本（不做过滤）
///
/// 只有当 `.` `!` `?` 后紧跟空白时才分割，空白本身被消耗掉。
/// 因此 "3.14" 或 "Hello.World" 不会被拆开。
fn split_after_terminals(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_terminal_punctuation(ch) {
            continue;
        }

        let boundary = idx + ch.len_utf8();
        let mut next = boundary;
        while let Some(&(ws_idx, ws)) = chars.peek() {
            if !ws.is_whitespace() {
                break;
            }
            next = ws_idx + ws.len_utf8();
            chars.next();
        }

        if next > boundary {
            pieces.push(&text[start..boundary]);
            start = next;
        }
    }

    pieces.push(&text[start..]);
    pieces
}

/// 对文本进行分段
///
/// 1. 句末标点 + 空白处分割
/// 2. 每段去除首尾空白
/// 3. 丢弃空段
pub fn split_sentences(text: &str) -> Vec<String> {
    split_after_terminals(text)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
