//! 上游解析接口
//!
//! - 链接模式：`<base>?url=<encoded>` 返回一个会 302 跳转的地址，再请求一次拿到跳转后的最终地址
//! - 元数据模式：`<base>?data&url=<encoded>` 返回视频信息 JSON

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::cdn::rewrite_media_url;
use super::types::{ResolutionResult, VideoMetadata};
use crate::AppState;

/// 拼接上游请求地址；`with_data` 为 true 时带上无值参数 `data`
pub fn build_upstream_url(base_url: &str, target: &str, with_data: bool) -> Result<Url> {
    let mut url = Url::parse(base_url).with_context(|| format!("上游地址无效: {base_url}"))?;
    let encoded = urlencoding::encode(target);
    let query = if with_data {
        format!("data&url={encoded}")
    } else {
        format!("url={encoded}")
    };
    url.set_query(Some(&query));
    Ok(url)
}

/// 元数据模式：获取视频信息，校验已知字段类型后原样返回上游 JSON
pub async fn fetch_metadata(state: &AppState, target: &str) -> Result<Value> {
    let api_url = build_upstream_url(&state.config.upstream.base_url, target, true)?;
    debug!("📡 请求元数据: {}", api_url);

    let resp = state
        .client
        .get(api_url)
        .send()
        .await
        .context("请求上游元数据接口失败")?;

    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("上游元数据接口返回 HTTP {}", status));
    }

    let text = resp.text().await.context("读取上游元数据响应失败")?;
    let data: Value = serde_json::from_str(&text).map_err(|e| {
        anyhow!(
            "上游元数据不是合法 JSON: {}, body: {}",
            e,
            snippet(&text, 200)
        )
    })?;

    validate_metadata(&data)?;
    Ok(data)
}

/// 上游 JSON 是外部输入：必须是对象，已知字段类型必须正确
fn validate_metadata(data: &Value) -> Result<VideoMetadata> {
    if !data.is_object() {
        return Err(anyhow!("上游元数据不是 JSON 对象"));
    }
    VideoMetadata::deserialize(data).map_err(|e| anyhow!("上游元数据字段类型不符: {}", e))
}

/// 链接模式：两跳解析，返回跳转前后的两个地址
pub async fn resolve_link(state: &AppState, target: &str) -> Result<ResolutionResult> {
    // 1. 上游返回一个会跳转的地址
    let api_url = build_upstream_url(&state.config.upstream.base_url, target, false)?;
    debug!("📡 请求视频地址: {}", api_url);

    let resp = state
        .client
        .get(api_url)
        .send()
        .await
        .context("请求上游解析接口失败")?;

    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("上游解析接口返回 HTTP {}", status));
    }

    let body = resp.text().await.context("读取上游解析响应失败")?;
    let original_url = parse_original_url(&body)?;
    debug!("🔗 原始地址: {}", original_url);

    // 2. 请求该地址并自动跟随跳转，最终响应的地址即视频直链；响应体不读取
    let final_resp = state
        .client
        .get(&original_url)
        .send()
        .await
        .with_context(|| format!("跟随跳转失败: {original_url}"))?;

    let status = final_resp.status();
    if !status.is_success() {
        return Err(anyhow!(
            "跟随跳转失败: {} 返回 HTTP {}",
            original_url,
            status
        ));
    }

    let final_url = rewrite_media_url(
        state.config.upstream.cdn.as_ref(),
        final_resp.url().as_str(),
    );
    info!("✅ 解析完成: {} -> {}", original_url, final_url);

    Ok(ResolutionResult {
        original_url,
        final_url,
    })
}

/// 校验上游返回的原始地址：非空、不是 HTML 错误页、是 http(s) 绝对地址
fn parse_original_url(body: &str) -> Result<String> {
    let text = body.trim();
    if text.is_empty() {
        return Err(anyhow!("上游返回空地址"));
    }
    if text.starts_with('<') {
        return Err(anyhow!(
            "上游返回了 HTML 页面而不是地址: {}",
            snippet(text, 100)
        ));
    }

    let url = Url::parse(text).map_err(|e| anyhow!("上游返回的地址无效: {} ({})", text, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("上游返回的地址不是 http(s): {}", text));
    }

    Ok(text.to_string())
}

/// 日志用的截断，按字符计数
fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
