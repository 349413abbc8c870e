//! 视频地址改写到缓存域名

use crate::config::CdnConfig;

/// 以 `strip_prefix` 开头的地址替换为 `domain` + 剩余路径，其余原样返回
pub fn rewrite_media_url(cdn: Option<&CdnConfig>, media_url: &str) -> String {
    let Some(cdn) = cdn else {
        return media_url.to_string();
    };

    let prefix = cdn.strip_prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return media_url.to_string();
    }

    match media_url.strip_prefix(prefix) {
        // 只匹配完整主机，`https://a.com` 不应命中 `https://a.com.evil`
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => {
            format!("{}{}", cdn.domain.trim_end_matches('/'), rest)
        }
        _ => media_url.to_string(),
    }
}
