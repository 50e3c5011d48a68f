/// 工具函数集合

/// 当前 Unix 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 生成设备 ID，格式为 `device_<毫秒时间戳>`
pub fn generate_device_id() -> String {
    format!("device_{}", now_millis())
}
