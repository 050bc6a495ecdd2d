//! ASS 时间码格式化

/// 乘法舍入误差的容差（以 ULP 计）
const ROUNDING_ULPS: f64 = 4.0;

/// 秒数转整百分秒，向下截断
///
/// `0.29 * 100` 得到 `28.999999999999996`，直接 floor 会丢掉一个百分秒。
/// 只补偿与乘积同量级的几个 ULP，因此 `0.9999999` 仍截断为 99。
fn total_centiseconds(seconds: f64) -> u64 {
    let scaled = seconds * 100.0;
    let tolerance = scaled * f64::EPSILON * ROUNDING_ULPS;
    (scaled + tolerance).floor() as u64
}

/// 将秒数格式化为 ASS 时间码 `H:MM:SS.CC`
///
/// 小时数不设上限，百分秒向下截断（不四舍五入），只容忍浮点乘法本身的舍入误差。
/// 负数和 NaN 视为 0。
pub fn format_ass_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let total_cs = total_centiseconds(seconds);

    let hours = total_cs / 360_000;
    let minutes = (total_cs / 6_000) % 60;
    let secs = (total_cs / 100) % 60;
    let centis = total_cs % 100;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}
