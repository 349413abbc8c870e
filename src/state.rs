//! 应用状态（配置 + 共享 HTTP Client）

use anyhow::Result;
use reqwest::{redirect, Client};
use std::time::Duration;

use crate::config::Config;

/// 最多跟随的跳转次数
pub const MAX_REDIRECTS: usize = 10;

pub struct AppState {
    pub config: Config,
    pub client: Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        // 出站请求一律不带 Referer，跳转时也不自动补
        let mut builder = Client::builder()
            .user_agent(Config::browser_ua())
            .referer(false)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.upstream.http_timeout_secs));
        if !config.upstream.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }
}
