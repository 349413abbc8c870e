use anyhow::{anyhow, Result};
use std::io::Read;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use douyin_relay::client::{ParseClient, ParseSession};
use douyin_relay::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "douyin_relay=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // 用法：douyin-relay <分享文本>（省略时从标准输入读取）
    let args: Vec<String> = std::env::args().skip(1).collect();
    let share_text = if args.is_empty() {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        args.join(" ")
    };

    let config_path = Config::resolve_path(std::env::var("CONFIG_PATH").ok(), None);
    let config = Config::load(&config_path)?;

    let client = ParseClient::new(
        &config.client.proxy_base,
        Duration::from_secs(config.upstream.http_timeout_secs),
    )?;
    let mut session = ParseSession::new(client);
    session.submit(&share_text).await;

    if let Some(msg) = session.error() {
        return Err(anyhow!("{}", msg));
    }

    let Some(view) = session.result() else {
        return Err(anyhow!("解析失败，请检查链接或稍后再试。"));
    };

    println!("标题: {}", view.title);
    println!("作者: {}", view.author);
    println!("点赞: {}  评论: {}  分享: {}", view.like_count, view.comment_count, view.share_count);
    println!("原始链接: {}", view.original_url);
    println!("下载地址: {}", view.download_url);
    println!("文件名: {}", view.download_filename);

    Ok(())
}
