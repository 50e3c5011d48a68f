/// AR Visualiser - 公共库
/// 
/// 提供客户端与服务端共享的事件类型、错误处理、工具函数等

pub mod errors;
pub mod models;
pub mod utils;
pub mod ws_event;

// 重新导出常用类型
pub use errors::{Error, Result};
pub use models::{ClientIdentity, ConnectionState};
pub use ws_event::{event_types, WsEvent};
