/// WebSocket 事件模块
/// 
/// 定义客户端与服务端之间传输的 JSON 事件信封及已知事件类型

pub mod message;
pub mod types;

pub use message::WsEvent;
pub use types as event_types;
