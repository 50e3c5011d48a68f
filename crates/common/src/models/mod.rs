/// 共享数据模型
///
/// 定义客户端与服务端共享的数据结构

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::utils::generate_device_id;

/// 连接状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    NotConnected,
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        *self == ConnectionState::Open
    }
}

/// 客户端身份
///
/// 构造后不可变；`session_id` 为空时取 `user_id`，`device_id` 为空时自动生成。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "IdentityFields")]
pub struct ClientIdentity {
    user_id: String,
    session_id: String,
    device_id: String,
}

/// 反序列化时的原始字段，经 [`ClientIdentity::new`] 校验
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityFields {
    user_id: String,
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    device_id: String,
}

impl TryFrom<IdentityFields> for ClientIdentity {
    type Error = Error;

    fn try_from(fields: IdentityFields) -> Result<Self> {
        Self::new(fields.user_id, fields.session_id, fields.device_id)
    }
}

impl ClientIdentity {
    /// 创建客户端身份
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Result<Self> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(Error::Config("userId 不能为空".to_string()));
        }

        let session_id = session_id.into();
        let session_id = if session_id.is_empty() {
            user_id.clone()
        } else {
            session_id
        };

        let device_id = device_id.into();
        let device_id = if device_id.is_empty() {
            generate_device_id()
        } else {
            device_id
        };

        Ok(Self {
            user_id,
            session_id,
            device_id,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}
