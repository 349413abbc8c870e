//! 中转接口测试：本地起一个假的上游接口，验证两种模式和错误映射
//!
//! 使用方法：
//! cargo test --test relay_test

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use douyin_relay::client::{ParseClient, ParseSession, TriggerState};
use douyin_relay::config::{CdnConfig, Config};
use douyin_relay::{web, AppState};

const SHARE_TEXT: &str = "看看这个 https://v.douyin.com/abc123/ 超好看";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Upstream {
    Healthy,
    Failing,
    HtmlBody,
    MetadataError,
    BrokenRedirect,
    BadMetadata,
}

#[derive(Clone)]
struct MockState {
    mode: Upstream,
    base: String,
}

async fn upstream_api(
    State(mock): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let is_data = params.contains_key("data");
    let source = params.get("url").cloned().unwrap_or_default();

    match (mock.mode, is_data) {
        (Upstream::Failing, _) => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        (Upstream::MetadataError, true) => Json(json!({ "error": "视频不存在" })).into_response(),
        (Upstream::BadMetadata, true) => Json(json!({ "digg_count": "很多" })).into_response(),
        (_, true) => Json(json!({
            "desc": "海边日落",
            "nickname": "小明",
            "digg_count": 25300,
            "comment_count": 812,
            "share_count": 15000,
            "aweme_id": "7300000000000000000",
            "source_url": source,
        }))
        .into_response(),
        (Upstream::HtmlBody, false) => "<html><body>502 Bad Gateway</body></html>".into_response(),
        (Upstream::BrokenRedirect, false) => format!("{}/play/missing", mock.base).into_response(),
        (_, false) => format!("{}/play/abc123\n", mock.base).into_response(),
    }
}

async fn play(Path(id): Path<String>) -> Redirect {
    Redirect::temporary(&format!("/media/{id}.mp4"))
}

async fn media(Path(file): Path<String>, headers: HeaderMap) -> Response {
    if headers.contains_key(header::REFERER) {
        return StatusCode::FORBIDDEN.into_response();
    }
    if file == "missing.mp4" {
        return StatusCode::NOT_FOUND.into_response();
    }
    "video-bytes".into_response()
}

async fn spawn_upstream(mode: Upstream) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = Router::new()
        .route("/", get(upstream_api))
        .route("/play/:id", get(play))
        .route("/media/:file", get(media))
        .with_state(MockState {
            mode,
            base: base.clone(),
        });
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

fn relay_config(upstream_base: &str) -> Config {
    let mut config = Config::default();
    config.upstream.base_url = upstream_base.to_string();
    config.upstream.http_timeout_secs = 5;
    config.upstream.use_system_proxy = false;
    config
}

fn relay_router(config: Config) -> Router {
    web::create_router(Arc::new(AppState::new(config).unwrap()))
}

async fn spawn_relay(config: Config) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = relay_router(config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn encoded_share_link() -> String {
    urlencoding::encode("https://v.douyin.com/abc123/").into_owned()
}

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let app = relay_router(relay_config("http://127.0.0.1:9"));

    for uri in [
        "/api/parse",
        "/api/parse?data",
        "/api/parse?data&foo=bar",
        "/api/parse?url=",
        "/.netlify/functions/parse?data",
    ] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(body["error"], "URL parameter is required.");
    }
}

#[tokio::test]
async fn test_metadata_is_relayed_unchanged() {
    let upstream = spawn_upstream(Upstream::Healthy).await;
    let app = relay_router(relay_config(&upstream));

    let uri = format!("/api/parse?data&url={}", encoded_share_link());
    let (status, body) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["desc"], "海边日落");
    assert_eq!(body["nickname"], "小明");
    assert_eq!(body["digg_count"], 25300);
    assert_eq!(body["share_count"], 15000);
    assert_eq!(body["aweme_id"], "7300000000000000000");
    assert_eq!(body["source_url"], "https://v.douyin.com/abc123/");
}

#[tokio::test]
async fn test_link_mode_follows_redirect() {
    let upstream = spawn_upstream(Upstream::Healthy).await;
    let app = relay_router(relay_config(&upstream));

    let uri = format!("/api/parse?url={}", encoded_share_link());
    let (status, body) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["originalUrl"], format!("{upstream}/play/abc123"));
    assert_eq!(body["finalUrl"], format!("{upstream}/media/abc123.mp4"));
}

#[tokio::test]
async fn test_link_mode_rewrites_to_cdn() {
    let upstream = spawn_upstream(Upstream::Healthy).await;
    let mut config = relay_config(&upstream);
    config.upstream.cdn = Some(CdnConfig {
        strip_prefix: upstream.clone(),
        domain: "https://cdn.example.com".to_string(),
    });
    let app = relay_router(config);

    let uri = format!("/api/parse?url={}", encoded_share_link());
    let (status, body) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finalUrl"], "https://cdn.example.com/media/abc123.mp4");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let upstream = spawn_upstream(Upstream::Failing).await;
    let app = relay_router(relay_config(&upstream));

    let (status, body) =
        get_json(app.clone(), &format!("/api/parse?url={}", encoded_share_link())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to get or resolve video URL.");

    let (status, body) =
        get_json(app, &format!("/api/parse?data&url={}", encoded_share_link())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch data from the video API.");
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let app = relay_router(relay_config("http://127.0.0.1:9"));

    let (status, _) = get_json(app, &format!("/api/parse?url={}", encoded_share_link())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_bad_upstream_payloads_are_bad_gateway() {
    for mode in [Upstream::HtmlBody, Upstream::BrokenRedirect] {
        let upstream = spawn_upstream(mode).await;
        let app = relay_router(relay_config(&upstream));
        let (status, _) =
            get_json(app, &format!("/api/parse?url={}", encoded_share_link())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    let upstream = spawn_upstream(Upstream::BadMetadata).await;
    let app = relay_router(relay_config(&upstream));
    let (status, _) = get_json(app, &format!("/api/parse?data&url={}", encoded_share_link())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_health() {
    let app = relay_router(relay_config("http://127.0.0.1:9"));
    let (status, body) = get_json(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

async fn session_for(mode: Upstream) -> (ParseSession, String) {
    let upstream = spawn_upstream(mode).await;
    let relay = spawn_relay(relay_config(&upstream)).await;
    let client = ParseClient::new(&relay, Duration::from_secs(5)).unwrap();
    (ParseSession::new(client), upstream)
}

#[tokio::test]
async fn test_end_to_end_success() {
    let (mut session, upstream) = session_for(Upstream::Healthy).await;

    session.submit(SHARE_TEXT).await;

    assert_eq!(session.trigger(), TriggerState::Ready);
    assert!(session.error().is_none());
    let view = session.result().expect("result should be visible");
    assert_eq!(view.player_url, format!("{upstream}/play/abc123"));
    assert_eq!(view.download_url, format!("{upstream}/media/abc123.mp4"));
    assert_eq!(view.download_filename, "小明-海边日落.mp4");
    assert_eq!(view.title, "海边日落");
    assert_eq!(view.author, "小明");
    assert_eq!(view.like_count, "2.5w");
    assert_eq!(view.comment_count, "812");
    assert_eq!(view.share_count, "1.5w");
}

#[tokio::test]
async fn test_end_to_end_metadata_error() {
    let (mut session, _) = session_for(Upstream::MetadataError).await;

    session.submit(SHARE_TEXT).await;

    assert_eq!(session.trigger(), TriggerState::Ready);
    assert!(session.result().is_none());
    assert_eq!(session.error(), Some("视频不存在"));
}

#[tokio::test]
async fn test_end_to_end_upstream_down() {
    let (mut session, _) = session_for(Upstream::Failing).await;

    session.submit(SHARE_TEXT).await;

    assert_eq!(session.trigger(), TriggerState::Ready);
    assert!(session.result().is_none());
    assert_eq!(session.error(), Some("Failed to get or resolve video URL."));
}

#[tokio::test]
async fn test_end_to_end_result_replaced_by_next_failure() {
    let (mut session, _) = session_for(Upstream::Healthy).await;

    session.submit(SHARE_TEXT).await;
    assert!(session.result().is_some());

    session.submit("没有链接的文本").await;
    assert!(session.result().is_none());
    assert_eq!(
        session.error(),
        Some("未能从输入内容中提取有效的抖音链接，请检查后重试。")
    );
}
