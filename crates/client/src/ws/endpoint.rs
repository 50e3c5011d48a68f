/// 连接地址
///
/// 在服务端基础 URL 上追加 `userId`、`sessionId`、`deviceId` 查询参数。

use common::{ClientIdentity, Error, Result};
use url::Url;

/// WebSocket 连接地址，构造后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEndpoint {
    url: Url,
}

impl ConnectionEndpoint {
    /// 由基础 URL 与客户端身份构造连接地址
    pub fn new(base_url: &str, identity: &ClientIdentity) -> Result<Self> {
        let mut url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("无效的服务器地址 '{}': {}", base_url, e)))?;

        match url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(Error::Config(format!(
                    "不支持的协议 '{}'，仅支持 ws:// 或 wss://",
                    other
                )))
            }
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(Error::Config(format!("服务器地址缺少主机: {}", base_url)));
        }

        url.query_pairs_mut()
            .append_pair("userId", identity.user_id())
            .append_pair("sessionId", identity.session_id())
            .append_pair("deviceId", identity.device_id());

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// 是否使用 TLS（wss://）
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "wss"
    }
}

impl std::fmt::Display for ConnectionEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}
