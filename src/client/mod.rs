//! 解析前端逻辑：提取短链、并发请求中转接口、生成展示数据

pub mod format;
pub mod parser;

pub use format::{download_filename, format_number};
pub use parser::extract_url;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::resolver::VideoMetadata;

/// 中转接口路径
pub const PARSE_ENDPOINT: &str = "/api/parse";

const EXTRACTION_MESSAGE: &str = "未能从输入内容中提取有效的抖音链接，请检查后重试。";
const FALLBACK_MESSAGE: &str = "解析失败，请检查链接或稍后再试。";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no short link found in share text")]
    Extraction,
    #[error("request to relay failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Payload(String),
}

impl ClientError {
    /// 展示给用户的错误信息：有上游消息就用上游消息，否则用通用提示
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Extraction => EXTRACTION_MESSAGE.to_string(),
            ClientError::Payload(msg) if !msg.is_empty() => msg.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// 链接模式返回；`finalUrl` 缺失时下载地址退回 `originalUrl`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkPayload {
    #[serde(default)]
    original_url: Option<String>,
    #[serde(default)]
    final_url: Option<String>,
}

/// 一次解析成功后的展示数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseView {
    pub player_url: String,
    pub original_url: String,
    pub download_url: String,
    pub download_filename: String,
    pub title: String,
    pub author: String,
    pub like_count: String,
    pub comment_count: String,
    pub share_count: String,
}

impl ParseView {
    fn build(link: LinkPayload, info: VideoMetadata) -> Result<Self, ClientError> {
        let original_url = link
            .original_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && !s.starts_with('<'))
            .ok_or_else(|| ClientError::Payload("未获取到有效的视频地址".to_string()))?;
        let download_url = link
            .final_url
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| original_url.clone());

        Ok(Self {
            player_url: original_url.clone(),
            download_filename: download_filename(info.nickname.as_deref(), info.desc.as_deref()),
            title: info
                .desc
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "无标题".to_string()),
            author: info
                .nickname
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "未知作者".to_string()),
            like_count: format_number(info.digg_count),
            comment_count: format_number(info.comment_count),
            share_count: format_number(info.share_count),
            original_url,
            download_url,
        })
    }
}

/// 访问中转接口的客户端
pub struct ParseClient {
    http: Client,
    endpoint: Url,
}

impl ParseClient {
    pub fn new(proxy_base: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(proxy_base)
            .and_then(|base| base.join(PARSE_ENDPOINT))
            .with_context(|| format!("中转服务地址无效: {proxy_base}"))?;
        // 中转服务是自己部署的，直连不走系统代理
        let http = Client::builder()
            .referer(false)
            .no_proxy()
            .timeout(timeout)
            .build()?;
        Ok(Self { http, endpoint })
    }

    /// 解析一段分享文本；没有短链时直接返回错误，不发任何请求
    pub async fn parse(&self, share_text: &str) -> Result<ParseView, ClientError> {
        let short_url = extract_url(share_text).ok_or(ClientError::Extraction)?;
        info!("🔍 提取到短链: {}", short_url);

        // 两个请求并发，任一失败即整体失败
        let (link, meta) = tokio::try_join!(
            self.fetch_json(&short_url, false),
            self.fetch_json(&short_url, true)
        )?;

        if let Some(msg) = error_field(&link).or_else(|| error_field(&meta)) {
            return Err(ClientError::Payload(msg));
        }

        let link: LinkPayload = serde_json::from_value(link)
            .map_err(|e| ClientError::Payload(format!("视频地址数据格式错误: {e}")))?;
        let meta: VideoMetadata = serde_json::from_value(meta)
            .map_err(|e| ClientError::Payload(format!("视频信息数据格式错误: {e}")))?;

        ParseView::build(link, meta)
    }

    fn request_url(&self, short_url: &str, with_data: bool) -> Url {
        let mut url = self.endpoint.clone();
        let encoded = urlencoding::encode(short_url);
        let query = if with_data {
            format!("data&url={encoded}")
        } else {
            format!("url={encoded}")
        };
        url.set_query(Some(&query));
        url
    }

    async fn fetch_json(&self, short_url: &str, with_data: bool) -> Result<Value, ClientError> {
        let resp = self
            .http
            .get(self.request_url(short_url, with_data))
            .send()
            .await?;
        // 错误响应体同样是 JSON，交给后面的 error 字段检查
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|_| {
            let head: String = text.chars().take(80).collect();
            ClientError::Payload(format!("中转接口返回了非 JSON 内容: {head}"))
        })
    }
}

fn error_field(payload: &Value) -> Option<String> {
    match payload.get("error")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 触发按钮的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Ready,
    Parsing,
}

/// 页面状态：每次提交都会替换上一次的结果或错误
pub struct ParseSession {
    client: ParseClient,
    trigger: TriggerState,
    result: Option<ParseView>,
    error: Option<String>,
}

impl ParseSession {
    pub fn new(client: ParseClient) -> Self {
        Self {
            client,
            trigger: TriggerState::Ready,
            result: None,
            error: None,
        }
    }

    pub fn trigger(&self) -> TriggerState {
        self.trigger
    }

    pub fn result(&self) -> Option<&ParseView> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 执行一次解析；无论成败，结束后按钮都回到 Ready
    pub async fn submit(&mut self, share_text: &str) {
        self.error = None;
        self.result = None;
        self.trigger = TriggerState::Parsing;

        match self.client.parse(share_text).await {
            Ok(view) => self.result = Some(view),
            Err(e) => {
                warn!("❌ 解析失败: {}", e);
                self.error = Some(e.user_message());
            }
        }

        self.trigger = TriggerState::Ready;
    }
}
