use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::runtime::StopFlag;

/// 进程级的协作式取消信号
///
/// 只有信号监听任务会调用 [`CancellationSignal::cancel`]，其余组件只在各自的检查点读取。
/// 取消时不会触碰文件记录或统计数据，只翻转标志并请求已登记的计时器停止。
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    token: CancellationToken,
    stop_flags: Arc<Mutex<Vec<Arc<StopFlag>>>>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求停止
    pub fn cancel(&self) {
        self.token.cancel();

        let flags = self.stop_flags.lock().unwrap_or_else(|e| e.into_inner());
        for flag in flags.iter() {
            flag.request_stop();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 登记一个在取消时需要停止的后台任务
    pub fn register_stop_flag(&self, flag: Arc<StopFlag>) {
        let mut flags = self.stop_flags.lock().unwrap_or_else(|e| e.into_inner());
        if self.token.is_cancelled() {
            flag.request_stop();
        }
        flags.push(flag);
    }
}
