//! 解析中转：调用上游接口获取视频地址与元数据

pub mod cdn;
pub mod types;
pub mod upstream;

pub use cdn::rewrite_media_url;
pub use types::{ResolutionResult, VideoMetadata};
pub use upstream::{build_upstream_url, fetch_metadata, resolve_link};
