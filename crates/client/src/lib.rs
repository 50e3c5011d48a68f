/// AR Visualiser - 客户端
/// 
/// 安全 WebSocket 客户端：可选客户端证书认证，发送结构化事件，接收 Server 推送

pub mod config;
pub mod tls;
pub mod ws;

pub use tls::ClientCertificate;
pub use ws::{ClientOptions, ConnectionEndpoint, EventHandlers, SecureSocketClient};
