/// 安全 WebSocket 客户端
///
/// 管理一条到 Server 的出站连接：连接、发送事件、后台接收、断开与释放。
/// 连接结果与错误通过 [`EventHandlers`] 通知调用方。

use common::{ClientIdentity, ConnectionState, Error, Result, WsEvent};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, WebSocketConfig};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::endpoint::ConnectionEndpoint;
use super::handler::EventHandlers;
use crate::tls::{self, ClientCertificate};

/// 单条入站消息的最大长度（512 KiB）
pub const RECEIVE_BUFFER_SIZE: usize = 512 * 1024;

/// 发送关闭帧后等待对端回应的最长时间
const CLOSE_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// 客户端构造参数
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Server 地址（ws:// 或 wss://）
    pub server_url: String,

    /// 用户 ID（必填）
    pub user_id: String,

    /// 会话 ID，为空时取用户 ID
    pub session_id: String,

    /// 设备 ID，为空时自动生成
    pub device_id: String,

    /// 客户端证书路径（PKCS#12，或包含证书链与私钥的 PEM）
    pub client_cert_path: Option<PathBuf>,

    /// 证书密码（PKCS#12 或加密私钥），可为空
    pub client_cert_password: Option<String>,

    /// 额外信任的根证书路径
    pub root_ca_path: Option<PathBuf>,
}

impl ClientOptions {
    pub fn new(server_url: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    /// 设置客户端证书，用于双向 TLS
    pub fn client_certificate(
        mut self,
        path: impl Into<PathBuf>,
        password: Option<String>,
    ) -> Self {
        self.client_cert_path = Some(path.into());
        self.client_cert_password = password;
        self
    }

    /// 信任自签名 Server 证书
    pub fn root_ca(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_ca_path = Some(path.into());
        self
    }
}

/// 后台接收任务共享的状态
struct ReceiveContext {
    handlers: Arc<EventHandlers>,
    state: Arc<RwLock<ConnectionState>>,
    writer: Arc<Mutex<Option<WsSink>>>,
    cancel: CancellationToken,
}

/// 安全 WebSocket 客户端
pub struct SecureSocketClient {
    /// 客户端身份
    identity: ClientIdentity,

    /// 连接地址
    endpoint: ConnectionEndpoint,

    /// 客户端证书（可选）
    certificate: Option<ClientCertificate>,

    /// TLS 配置，构造时生成
    tls_config: Arc<rustls::ClientConfig>,

    /// 事件处理器
    handlers: Arc<EventHandlers>,

    /// 连接状态
    state: Arc<RwLock<ConnectionState>>,

    /// 写半部，连接打开期间存在
    writer: Arc<Mutex<Option<WsSink>>>,

    /// 后台接收任务
    receive_task: Mutex<Option<JoinHandle<()>>>,

    /// 取消信号，触发后不再重置
    cancel: CancellationToken,

    /// disconnect() 是否已发出断开通知
    disconnect_notified: AtomicBool,
}

impl SecureSocketClient {
    /// 创建客户端
    ///
    /// URL、身份或证书无效时立即返回配置错误，不产生任何网络活动。
    pub fn new(options: ClientOptions, handlers: EventHandlers) -> Result<Self> {
        let identity = ClientIdentity::new(options.user_id, options.session_id, options.device_id)?;
        let endpoint = ConnectionEndpoint::new(&options.server_url, &identity)?;

        let certificate = match options.client_cert_path {
            Some(path) => Some(ClientCertificate::from_file(
                path,
                options.client_cert_password.as_deref(),
            )?),
            None => None,
        };

        let extra_roots = match options.root_ca_path {
            Some(path) => tls::load_root_certificates(path)?,
            None => Vec::new(),
        };

        let tls_config = tls::build_client_config(certificate.as_ref(), &extra_roots)?;

        debug!(
            "客户端已创建: endpoint={}, mtls={}",
            endpoint,
            certificate.is_some()
        );

        Ok(Self {
            identity,
            endpoint,
            certificate,
            tls_config,
            handlers: Arc::new(handlers),
            state: Arc::new(RwLock::new(ConnectionState::NotConnected)),
            writer: Arc::new(Mutex::new(None)),
            receive_task: Mutex::new(None),
            cancel: CancellationToken::new(),
            disconnect_notified: AtomicBool::new(false),
        })
    }

    /// 连接到 Server
    ///
    /// 成功时触发 `connected` 并启动唯一的后台接收任务；失败时触发 `error`，
    /// 状态保持 `NotConnected`。返回值与通知一致。
    pub async fn connect(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            debug!("客户端已取消，忽略连接请求");
            return Err(Error::Cancelled);
        }

        match self.state().await {
            ConnectionState::Open => {
                debug!("连接已打开，忽略重复连接");
                return Ok(());
            }
            ConnectionState::Closing => {
                debug!("正在断开，忽略连接请求");
                return Err(Error::Cancelled);
            }
            _ => {}
        }

        info!("尝试连接到 Server: {}", self.endpoint);

        let handshake = connect_async_tls_with_config(
            self.endpoint.as_str(),
            Some(websocket_config()),
            false,
            Some(Connector::Rustls(self.tls_config.clone())),
        );

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = handshake => result.map_err(|e| Error::Connect(e.to_string())),
        };

        let ws_stream = match result {
            Ok((ws_stream, _response)) => ws_stream,
            Err(Error::Cancelled) => {
                debug!("连接过程中被取消");
                return Err(Error::Cancelled);
            }
            Err(e) => {
                error!("连接错误: {}", e);
                self.handlers.emit_error(&e);
                return Err(e);
            }
        };

        info!("✅ WebSocket 连接成功");

        let (sink, source) = ws_stream.split();
        *self.writer.lock().await = Some(sink);
        *self.state.write().await = ConnectionState::Open;
        self.disconnect_notified.store(false, Ordering::SeqCst);

        // connected 必须先于任何消息通知
        self.handlers.emit_connected();

        let ctx = ReceiveContext {
            handlers: self.handlers.clone(),
            state: self.state.clone(),
            writer: self.writer.clone(),
            cancel: self.cancel.clone(),
        };
        let task = tokio::spawn(receive_loop(source, ctx));
        *self.receive_task.lock().await = Some(task);

        Ok(())
    }

    /// 发送事件
    ///
    /// 连接未打开时直接返回 `Ok(false)`，不写入也不通知。
    /// 写入失败会触发 `error` 并返回错误。
    pub async fn send<T>(&self, event_type: impl Into<String>, data: &T) -> Result<bool>
    where
        T: Serialize + ?Sized,
    {
        if !self.can_send().await {
            debug!("连接未打开，跳过发送");
            return Ok(false);
        }

        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                let err = Error::from(e);
                error!("序列化事件失败: {}", err);
                self.handlers.emit_error(&err);
                return Err(err);
            }
        };

        let event = WsEvent::new(event_type, &self.identity, data);
        self.send_event(&event).await
    }

    /// 发送已构造好的事件信封
    pub async fn send_event(&self, event: &WsEvent) -> Result<bool> {
        if !self.can_send().await {
            debug!("连接未打开，跳过发送");
            return Ok(false);
        }

        let json = match event.to_json() {
            Ok(json) => json,
            Err(e) => {
                let err = Error::from(e);
                error!("序列化事件失败: {}", err);
                self.handlers.emit_error(&err);
                return Err(err);
            }
        };

        let mut writer = self.writer.lock().await;
        let sink = match writer.as_mut() {
            Some(sink) => sink,
            None => return Ok(false),
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = sink.send(Message::Text(json)) => {
                result.map_err(|e| Error::Transport(e.to_string()))
            }
        };

        match result {
            Ok(()) => {
                debug!("已发送事件: type={}", event.event_type);
                Ok(true)
            }
            Err(Error::Cancelled) => {
                debug!("发送过程中被取消");
                Err(Error::Cancelled)
            }
            Err(e) => {
                error!("发送消息失败: {}", e);
                self.handlers.emit_error(&e);
                Err(e)
            }
        }
    }

    /// 断开连接
    ///
    /// 连接打开时以正常关闭码发起关闭握手，并在限定时间内等待对端回应，
    /// 随后触发取消信号。
    /// 首次调用总会触发一次 `disconnected`，之后的调用不再通知。
    pub async fn disconnect(&self) {
        let was_open = {
            let mut state = self.state.write().await;
            if state.is_open() {
                *state = ConnectionState::Closing;
                true
            } else {
                false
            }
        };

        let mut close_sent = false;
        if let Some(mut sink) = self.writer.lock().await.take() {
            if was_open {
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "Client closing".into(),
                };
                match sink.send(Message::Close(Some(frame))).await {
                    Ok(()) => {
                        debug!("已发送关闭帧");
                        close_sent = true;
                    }
                    Err(e) => debug!("发送关闭帧失败: {}", e),
                }
            }
        }

        if close_sent {
            self.await_close_reply().await;
        }

        self.cancel.cancel();
        self.join_receive_task().await;
        self.mark_closed().await;

        if !self.disconnect_notified.swap(true, Ordering::SeqCst) {
            info!("连接已断开");
            self.handlers.emit_disconnected();
        }
    }

    /// 释放连接资源
    ///
    /// 可重复调用。不触发任何通知。
    pub async fn dispose(&self) {
        self.cancel.cancel();

        if let Some(task) = self.receive_task.lock().await.take() {
            task.abort();
        }

        if self.writer.lock().await.take().is_some() {
            debug!("已释放连接");
        }

        self.mark_closed().await;
    }

    /// 获取当前状态
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// 连接是否打开
    pub async fn is_open(&self) -> bool {
        self.state().await.is_open()
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn endpoint(&self) -> &ConnectionEndpoint {
        &self.endpoint
    }

    pub fn client_certificate(&self) -> Option<&ClientCertificate> {
        self.certificate.as_ref()
    }

    async fn can_send(&self) -> bool {
        !self.cancel.is_cancelled() && self.state().await.is_open()
    }

    /// 等待接收任务读到对端的关闭回应，超时则放弃
    async fn await_close_reply(&self) {
        let mut guard = self.receive_task.lock().await;
        let Some(task) = guard.as_mut() else {
            return;
        };

        match tokio::time::timeout(CLOSE_REPLY_TIMEOUT, task).await {
            Ok(_) => {
                debug!("关闭握手完成");
                *guard = None;
            }
            Err(_) => warn!("等待关闭回应超时"),
        }
    }

    async fn join_receive_task(&self) {
        let task = self.receive_task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("接收任务异常退出: {}", e);
                }
            }
        }
    }

    async fn mark_closed(&self) {
        let mut state = self.state.write().await;
        *state = ConnectionState::Closed;
    }
}

impl Drop for SecureSocketClient {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.receive_task.get_mut().take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for SecureSocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureSocketClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("identity", &self.identity)
            .field("mtls", &self.certificate.is_some())
            .finish()
    }
}

fn websocket_config() -> WebSocketConfig {
    let mut config = WebSocketConfig::default();
    config.max_message_size = Some(RECEIVE_BUFFER_SIZE);
    config.max_frame_size = Some(RECEIVE_BUFFER_SIZE);
    config
}

/// 后台接收循环
///
/// 每次读取一帧；收到关闭帧、读取出错或被取消时结束。
/// 本端发起关闭后只等待对端的关闭回应，不再通知。
async fn receive_loop(mut source: WsSource, ctx: ReceiveContext) {
    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => break,
            next = source.next() => next,
        };

        if *ctx.state.read().await == ConnectionState::Closing {
            match next {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => continue,
            }
        }

        match next {
            Some(Ok(Message::Text(text))) => {
                debug!("收到消息: {} 字节", text.len());
                ctx.handlers.emit_message(&text);
            }
            Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                Ok(text) => {
                    debug!("收到二进制消息: {} 字节", text.len());
                    ctx.handlers.emit_message(&text);
                }
                Err(e) => {
                    fail(&ctx, Error::Transport(format!("消息不是有效的 UTF-8: {}", e))).await;
                    break;
                }
            },
            Some(Ok(Message::Close(frame))) => {
                warn!("收到连接关闭消息: {:?}", frame);
                if let Some(mut sink) = ctx.writer.lock().await.take() {
                    if let Err(e) = sink.close().await {
                        debug!("关闭握手未完成: {}", e);
                    }
                }
                *ctx.state.write().await = ConnectionState::Closed;
                ctx.handlers.emit_disconnected();
                break;
            }
            Some(Ok(_)) => {
                // ping/pong 由 tungstenite 自动处理
            }
            Some(Err(e)) => {
                fail(&ctx, Error::Transport(e.to_string())).await;
                break;
            }
            None => {
                warn!("连接在没有关闭帧的情况下结束");
                ctx.writer.lock().await.take();
                *ctx.state.write().await = ConnectionState::Closed;
                ctx.handlers.emit_disconnected();
                break;
            }
        }
    }
    debug!("接收任务结束");
}

async fn fail(ctx: &ReceiveContext, err: Error) {
    error!("接收消息错误: {}", err);
    ctx.writer.lock().await.take();
    *ctx.state.write().await = ConnectionState::Closed;
    ctx.handlers.emit_error(&err);
}
