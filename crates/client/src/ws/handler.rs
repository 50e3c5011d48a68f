/// 事件处理器注册表
///
/// 调用方在创建客户端之前注册四类回调：连接成功、收到消息、连接断开、错误。
/// 每类可注册多个处理器，按注册顺序调用。

use common::Error;
use std::sync::Arc;
use tracing::warn;

/// 连接成功 / 断开处理器
pub type LifecycleHandler = Arc<dyn Fn() + Send + Sync>;

/// 消息处理器，参数为原始文本
pub type MessageHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// 错误处理器
pub type ErrorHandler = Arc<dyn Fn(&Error) + Send + Sync>;

/// 事件处理器注册表
#[derive(Clone, Default)]
pub struct EventHandlers {
    connected: Vec<LifecycleHandler>,
    message: Vec<MessageHandler>,
    disconnected: Vec<LifecycleHandler>,
    error: Vec<ErrorHandler>,
}

impl EventHandlers {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册连接成功处理器
    pub fn on_connected<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.connected.push(Arc::new(handler));
        self
    }

    /// 注册消息处理器
    pub fn on_message<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.message.push(Arc::new(handler));
        self
    }

    /// 注册连接断开处理器
    pub fn on_disconnected<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.disconnected.push(Arc::new(handler));
        self
    }

    /// 注册错误处理器
    pub fn on_error<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.error.push(Arc::new(handler));
        self
    }

    pub(crate) fn emit_connected(&self) {
        for handler in &self.connected {
            handler();
        }
    }

    pub(crate) fn emit_message(&self, message: &str) {
        for handler in &self.message {
            handler(message);
        }
    }

    pub(crate) fn emit_disconnected(&self) {
        for handler in &self.disconnected {
            handler();
        }
    }

    pub(crate) fn emit_error(&self, err: &Error) {
        if self.error.is_empty() {
            warn!("未注册错误处理器，错误被忽略: {}", err);
            return;
        }
        for handler in &self.error {
            handler(err);
        }
    }
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandlers")
            .field("connected", &self.connected.len())
            .field("message", &self.message.len())
            .field("disconnected", &self.disconnected.len())
            .field("error", &self.error.len())
            .finish()
    }
}
