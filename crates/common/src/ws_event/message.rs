/// WebSocket 事件消息定义

use serde::{Deserialize, Serialize};

use crate::models::ClientIdentity;
use crate::utils::now_millis;

/// 事件信封
///
/// 每个出站事件序列化为一个文本帧。`user_id` 与 `session_id` 仅供参考，
/// 服务端会用连接上的身份覆盖它们。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WsEvent {
    /// 事件类型
    pub event_type: String,

    /// 用户 ID
    pub user_id: String,

    /// 会话 ID
    pub session_id: String,

    /// 毫秒时间戳
    pub timestamp: i64,

    /// 事件负载
    pub data: serde_json::Value,
}

impl WsEvent {
    /// 以当前时间创建事件
    pub fn new(
        event_type: impl Into<String>,
        identity: &ClientIdentity,
        data: serde_json::Value,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            user_id: identity.user_id().to_string(),
            session_id: identity.session_id().to_string(),
            timestamp: now_millis(),
            data,
        }
    }

    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// 从 JSON 字符串反序列化
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_s3_event(&self) -> bool {
        super::types::is_s3_event(&self.event_type)
    }

    pub fn is_command_event(&self) -> bool {
        super::types::is_command_event(&self.event_type)
    }
}
