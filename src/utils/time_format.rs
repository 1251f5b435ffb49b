use chrono::{DateTime, Local};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 格式化时间为友好显示格式
pub fn format_time(time: SystemTime) -> String {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => {
            if let Some(datetime) = DateTime::from_timestamp(duration.as_secs() as i64, 0) {
                let local_time = datetime.with_timezone(&Local);
                local_time.format("%Y-%m-%d %H:%M:%S").to_string()
            } else {
                "未知时间".to_string()
            }
        }
        Err(_) => "未知时间".to_string(),
    }
}

/// 格式化经过的时间为 HH:MM:SS
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
