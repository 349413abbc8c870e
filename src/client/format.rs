//! 展示格式化

/// 计数展示：缺失为 `N/A`，一万及以上以「w」为单位保留一位小数（四舍五入，与页面一致）
pub fn format_number(num: Option<u64>) -> String {
    match num {
        None => "N/A".to_string(),
        Some(n) if n >= 10_000 => {
            let tenths = (n + 500) / 1000;
            format!("{}.{}w", tenths / 10, tenths % 10)
        }
        Some(n) => n.to_string(),
    }
}

/// 下载文件名：`<作者>-<描述>.mp4`，缺失时分别用 `douyin` / `video`
pub fn download_filename(nickname: Option<&str>, desc: Option<&str>) -> String {
    let nickname = nickname.filter(|s| !s.is_empty()).unwrap_or("douyin");
    let desc = desc.filter(|s| !s.is_empty()).unwrap_or("video");
    format!("{nickname}-{desc}.mp4")
}
