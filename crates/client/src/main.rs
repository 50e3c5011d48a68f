/// AR Visualiser - 控制台客户端
///
/// 连接到 Server，发送一条测试事件，并把收到的消息打印到控制台

use client::config::Config;
use client::{EventHandlers, SecureSocketClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    dotenvy::dotenv().ok();
    let cfg = Config::from_env()?;

    // 初始化日志
    // RUST_LOG 优先，例如：RUST_LOG=client=debug cargo run
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.log_level))
        )
        .init();

    info!("🚀 启动 AR Visualiser 客户端...");
    info!("🎯 Server: {}", cfg.server_ws_url);
    info!("📌 用户 ID: {}", cfg.user_id);

    let mut handlers = EventHandlers::new();
    handlers
        .on_connected(|| println!("Connected to server!"))
        .on_message(|msg| println!("Received: {}", msg))
        .on_disconnected(|| println!("Disconnected from server"))
        .on_error(|e| println!("Error: {}", e));

    let client = SecureSocketClient::new(cfg.client_options(), handlers)?;

    // 连接结果通过回调输出
    let _ = client.connect().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Press Enter to send a test message");
    lines.next_line().await?;

    let sent = client
        .send(
            "testEvent",
            &serde_json::json!({ "content": "Hello from Rust client!" }),
        )
        .await
        .unwrap_or(false);
    if !sent {
        info!("测试事件未发送");
    }

    println!("Press Enter to disconnect");
    lines.next_line().await?;

    client.disconnect().await;
    client.dispose().await;

    Ok(())
}
