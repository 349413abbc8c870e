//! 分享文本解析（只提取抖音短链）

use regex::Regex;
use std::sync::OnceLock;

/// 从分享文本中提取第一个抖音短链
///
/// 支持：
/// - https://v.douyin.com/abc123/
/// - 复制整段分享口令，例如 `7.43 复制打开抖音，看看【xx的作品】 https://v.douyin.com/iRNBho6u/ 超好看`
pub fn extract_url(text: &str) -> Option<String> {
    static SHORT_LINK_RE: OnceLock<Regex> = OnceLock::new();
    let re = SHORT_LINK_RE
        .get_or_init(|| Regex::new(r"https?://v\.douyin\.com/[a-zA-Z0-9]+/?").unwrap());
    re.find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_share_text() {
        assert_eq!(
            extract_url("看看这个 https://v.douyin.com/abc123/ 超好看"),
            Some("https://v.douyin.com/abc123/".to_string())
        );
    }

    #[test]
    fn test_first_match_wins() {
        let text = "http://v.douyin.com/first next https://v.douyin.com/second/";
        assert_eq!(extract_url(text), Some("http://v.douyin.com/first".to_string()));
    }

    #[test]
    fn test_stops_at_non_alphanumeric() {
        assert_eq!(
            extract_url("https://v.douyin.com/AbC9?share=1"),
            Some("https://v.douyin.com/AbC9".to_string())
        );
    }

    #[test]
    fn test_no_match() {
        for text in [
            "",
            "没有链接",
            "https://www.douyin.com/video/123",
            "https://v.douyin.com/",
            "https://v-douyin.com/abc",
        ] {
            assert_eq!(extract_url(text), None, "should not match: {}", text);
        }
    }
}
