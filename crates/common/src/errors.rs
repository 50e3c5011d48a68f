use thiserror::Error;

/// 统一错误类型
#[derive(Error, Debug)]
pub enum Error {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("证书错误: {0}")]
    Tls(String),

    #[error("连接错误: {0}")]
    Connect(String),

    #[error("传输错误: {0}")]
    Transport(String),

    #[error("操作已取消")]
    Cancelled,

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// 是否为构造阶段的配置类错误（URL、身份或证书）
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Tls(_))
    }

    /// 是否由取消信号引起
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// 统一结果类型
pub type Result<T> = std::result::Result<T, Error>;
