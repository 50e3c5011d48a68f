/// 已知事件类型
///
/// 与服务端约定的事件类型字符串；客户端可以发送任意字符串，这里只列出已知取值。

// ============================================================================
// 指令事件
// ============================================================================

pub const COMMAND_SELECT: &str = "COMMAND_SELECT";
pub const COMMAND_DELETE: &str = "COMMAND_DELETE";
pub const COMMAND_MOVE: &str = "COMMAND_MOVE";
pub const COMMAND_ROTATE: &str = "COMMAND_ROTATE";
pub const COMMAND_SCREENSHOT: &str = "COMMAND_SCREENSHOT";
pub const COMMAND_SPEECH: &str = "COMMAND_SPEECH";

// ============================================================================
// 截图事件
// ============================================================================

pub const SCREENSHOT_SEND: &str = "SCREENSHOT_SEND";
pub const SCREENSHOT_RECEIVE: &str = "SCREENSHOT_RECEIVE";

// ============================================================================
// S3 事件
// ============================================================================

pub const S3_UPLOAD_REQUEST: &str = "S3_UPLOAD_REQUEST";
pub const S3_UPLOAD_RESPONSE: &str = "S3_UPLOAD_RESPONSE";
pub const S3_SYNC_REQUEST: &str = "S3_SYNC_REQUEST";
pub const S3_SYNC_RESPONSE: &str = "S3_SYNC_RESPONSE";
pub const S3_DELETE_REQUEST: &str = "S3_DELETE_REQUEST";
pub const S3_DELETE_RESPONSE: &str = "S3_DELETE_RESPONSE";
pub const S3_ERROR: &str = "S3_ERROR";

const S3_PREFIX: &str = "S3_";
const COMMAND_PREFIX: &str = "COMMAND_";

/// 是否为 S3 事件
pub fn is_s3_event(event_type: &str) -> bool {
    event_type.starts_with(S3_PREFIX)
}

/// 是否为指令事件
pub fn is_command_event(event_type: &str) -> bool {
    event_type.starts_with(COMMAND_PREFIX)
}
