//! Web 服务器模块

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::client::PARSE_ENDPOINT;
use crate::config::Config;
use crate::{resolver, AppState};

static HTML_TEMPLATE: &str = include_str!("../templates/index.html");

/// 旧页面使用的函数路径，保留兼容
const LEGACY_PARSE_ENDPOINT: &str = "/.netlify/functions/parse";

/// `data` 只看是否出现，不看取值
#[derive(Debug, Deserialize)]
pub struct ParseQuery {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
}

/// 中转接口的失败类型；上游细节只写日志，不返回给调用方
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("URL parameter is required.")]
    MissingParameter,
    #[error("Failed to fetch data from the video API.")]
    MetadataUnavailable,
    #[error("Failed to get or resolve video URL.")]
    LinkUnavailable,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::MissingParameter => StatusCode::BAD_REQUEST,
            ProxyError::MetadataUnavailable | ProxyError::LinkUnavailable => {
                StatusCode::BAD_GATEWAY
            }
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// 首页
pub async fn index_handler() -> Html<&'static str> {
    Html(HTML_TEMPLATE)
}

/// 健康检查
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION,
    })
}

/// 解析中转：带 `data` 时返回视频信息，否则返回跳转前后的视频地址
pub async fn parse_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ParseQuery>,
) -> Result<Response, ProxyError> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or(ProxyError::MissingParameter)?;

    if query.data.is_some() {
        info!("📥 元数据请求: {}", url);
        let data = resolver::fetch_metadata(state.as_ref(), &url)
            .await
            .map_err(|e| {
                error!("❌ 获取视频信息失败: {:#}", e);
                ProxyError::MetadataUnavailable
            })?;
        return Ok(Json(data).into_response());
    }

    info!("📥 链接请求: {}", url);
    let result = resolver::resolve_link(state.as_ref(), &url)
        .await
        .map_err(|e| {
            error!("❌ 获取或跟随视频地址失败: {:#}", e);
            ProxyError::LinkUnavailable
        })?;
    Ok(Json(result).into_response())
}

/// 启动时打印上游与解析策略，便于排查
pub fn log_startup(config: &Config, config_path: &str) {
    if std::path::Path::new(config_path).exists() {
        info!("✅ 配置加载完成: {}", config_path);
    } else {
        info!("✅ 未找到 {}，使用默认值与环境变量", config_path);
    }
    info!("🔗 上游接口: {}", config.upstream.base_url);
    info!(
        "🔁 链接模式: 两跳解析（返回 originalUrl + finalUrl），超时 {}s，最多跟随 {} 次跳转",
        config.upstream.http_timeout_secs,
        crate::state::MAX_REDIRECTS
    );
    match &config.upstream.cdn {
        Some(cdn) => info!("🌍 CDN 改写: {} -> {}", cdn.strip_prefix, cdn.domain),
        None => info!("🌍 CDN 改写: 未启用"),
    }
    if !config.upstream.use_system_proxy {
        info!("🚫 出站请求不走系统代理");
    }
}

/// 创建 Web 路由
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route(PARSE_ENDPOINT, get(parse_handler))
        .route(LEGACY_PARSE_ENDPOINT, get(parse_handler))
        .with_state(state)
}
