//! 解析中转服务入口

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use douyin_relay::{config::Config, web, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "douyin_relay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = Config::resolve_path(
        std::env::var("CONFIG_PATH").ok(),
        std::env::args().nth(1),
    );
    let config = Config::load(&config_path)?;
    web::log_startup(&config, &config_path);

    let addr = format!("0.0.0.0:{}", config.web.port);
    let app = web::create_router(Arc::new(AppState::new(config)?));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 监听 http://{}，解析接口 /api/parse", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
