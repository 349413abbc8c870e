//! 配置文件加载

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// 上游解析接口
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// 是否使用 HTTP_PROXY / HTTPS_PROXY 等系统代理
    #[serde(default = "default_use_system_proxy")]
    pub use_system_proxy: bool,
    /// 视频地址改写到缓存域名（可选）
    #[serde(default)]
    pub cdn: Option<CdnConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CdnConfig {
    /// 需要剥离的原始主机前缀，例如 `https://v26-web.douyinvod.com`
    pub strip_prefix: String,
    /// 替换上去的域名，例如 `https://cdn.example.com`
    pub domain: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

/// 命令行客户端使用的中转服务地址
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_proxy_base")]
    pub proxy_base: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            http_timeout_secs: default_http_timeout_secs(),
            use_system_proxy: default_use_system_proxy(),
            cdn: None,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_base: default_proxy_base(),
        }
    }
}

fn default_base_url() -> String {
    std::env::var("UPSTREAM_BASE_URL").unwrap_or_else(|_| "https://dyapi.hbum.de".to_string())
}

fn default_http_timeout_secs() -> u64 {
    std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(15)
}

fn default_use_system_proxy() -> bool {
    true
}

fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5200)
}

fn default_proxy_base() -> String {
    std::env::var("PROXY_BASE").unwrap_or_else(|_| "http://127.0.0.1:5200".to_string())
}

impl Config {
    /// 配置文件路径：环境变量 CONFIG_PATH 优先，其次命令行参数，默认 `config.toml`
    pub fn resolve_path(env_path: Option<String>, arg_path: Option<String>) -> String {
        env_path
            .filter(|p| !p.is_empty())
            .or(arg_path)
            .unwrap_or_else(|| "config.toml".to_string())
    }

    /// 读取 TOML 配置；文件不存在时退回默认值（默认值可被环境变量覆盖）
    pub fn load(path: &str) -> Result<Self> {
        let config: Config = if Path::new(path).exists() {
            let content =
                fs::read_to_string(path).with_context(|| format!("读取配置文件失败: {path}"))?;
            toml::from_str(&content).with_context(|| format!("解析配置文件失败: {path}"))?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.upstream.base_url)
            .map_err(|e| anyhow!("upstream.base_url 无效: {} ({})", self.upstream.base_url, e))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!("upstream.base_url 必须是 http(s) 地址"));
        }
        if self.upstream.http_timeout_secs == 0 {
            return Err(anyhow!("upstream.http_timeout_secs 不能为 0"));
        }
        Ok(())
    }

    pub fn browser_ua() -> &'static str {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
    }
}
