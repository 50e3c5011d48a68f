/// 配置管理

use serde::Deserialize;
use std::path::PathBuf;

use crate::ws::ClientOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server_ws_url: String,
    pub user_id: String,
    pub session_id: String,
    pub device_id: String,
    pub client_cert_path: Option<PathBuf>,
    pub client_cert_password: Option<String>,
    pub root_ca_path: Option<PathBuf>,
    pub log_level: String,
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置，空值视为未设置
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server_ws_url = get("SERVER_WS_URL")
            .unwrap_or_else(|| "wss://localhost:8443/ws".to_string());

        let user_id = get("USER_ID").unwrap_or_else(|| "user123".to_string());

        let session_id = get("SESSION_ID").unwrap_or_default();

        let device_id = get("DEVICE_ID").unwrap_or_default();

        let client_cert_path = get("CLIENT_CERT_PATH").map(PathBuf::from);

        let client_cert_password = get("CLIENT_CERT_PASSWORD");

        let root_ca_path = get("ROOT_CA_PATH").map(PathBuf::from);

        let log_level = get("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        if client_cert_password.is_some() && client_cert_path.is_none() {
            anyhow::bail!("设置了 CLIENT_CERT_PASSWORD 但缺少 CLIENT_CERT_PATH");
        }

        Ok(Self {
            server_ws_url,
            user_id,
            session_id,
            device_id,
            client_cert_path,
            client_cert_password,
            root_ca_path,
            log_level,
        })
    }

    /// 转换为客户端构造参数
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::new(&self.server_ws_url, &self.user_id)
            .session_id(&self.session_id)
            .device_id(&self.device_id);

        if let Some(path) = &self.client_cert_path {
            options = options.client_certificate(path, self.client_cert_password.clone());
        }
        if let Some(path) = &self.root_ca_path {
            options = options.root_ca(path);
        }

        options
    }
}
