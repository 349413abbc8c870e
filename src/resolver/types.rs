//! 数据类型

use serde::{Deserialize, Serialize};

/// 链接模式的返回：上游给出的原始地址 + 跟随跳转后的最终地址
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub original_url: String,
    pub final_url: String,
}

/// 元数据中需要校验/展示的字段；上游其余字段不在此列
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub digg_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub share_count: Option<u64>,
}
