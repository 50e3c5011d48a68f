/// WebSocket 客户端模块
/// 
/// 客户端通过 WebSocket（可选双向 TLS）连接到 Server

pub mod client;
pub mod endpoint;
pub mod handler;

pub use client::{ClientOptions, SecureSocketClient, RECEIVE_BUFFER_SIZE};
pub use endpoint::ConnectionEndpoint;
pub use handler::EventHandlers;
