use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle};

use crate::runtime::CancellationSignal;
use crate::utils::format_elapsed;

/// 计时器刷新周期
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// 当前显示中的计时器，终端日志输出时需要先让它让出这一行
static ACTIVE_SPINNER: Mutex<Option<(u64, ProgressBar)>> = Mutex::new(None);
static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(0);

/// 暂停当前计时器的显示执行 `f`，之后重绘；没有计时器时直接执行
pub fn suspend_spinner<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let active = ACTIVE_SPINNER
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
        .map(|(_, bar)| bar.clone());

    match active {
        Some(bar) => bar.suspend(f),
        None => f(),
    }
}

/// 由锁保护的运行标志，停止请求会立即唤醒等待中的线程
#[derive(Debug)]
pub struct StopFlag {
    running: Mutex<bool>,
    wake: Condvar,
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl StopFlag {
    pub fn new() -> Self {
        Self {
            running: Mutex::new(true),
            wake: Condvar::new(),
        }
    }

    /// 请求停止，可以重复调用
    pub fn request_stop(&self) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        *running = false;
        self.wake.notify_all();
    }

    pub fn is_running(&self) -> bool {
        *self.running.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 等待一个周期或停止请求，返回是否仍在运行
    fn wait_tick(&self, period: Duration) -> bool {
        let running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        let (running, _) = self
            .wake
            .wait_timeout_while(running, period, |running| *running)
            .unwrap_or_else(|e| e.into_inner());
        *running
    }
}

/// 扫描期间每秒显示一次已运行时间
///
/// 只读写自己的停止标志和终端，不接触统计或文件记录。
pub struct CountdownTimer {
    id: u64,
    flag: Arc<StopFlag>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    /// 启动计时器线程，并登记到取消信号上
    pub fn start(signal: &CancellationSignal) -> Self {
        // 测试时不绘制
        let bar = if cfg!(test) {
            ProgressBar::hidden()
        } else {
            Self::create_spinner()
        };

        let id = NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed);
        *ACTIVE_SPINNER.lock().unwrap_or_else(|e| e.into_inner()) = Some((id, bar.clone()));

        let flag = Arc::new(StopFlag::new());
        signal.register_stop_flag(flag.clone());

        let thread_flag = flag.clone();
        let started = Instant::now();
        let handle = thread::Builder::new()
            .name("countdown-timer".to_string())
            .spawn(move || {
                loop {
                    bar.set_message(format_elapsed(started.elapsed()));
                    bar.tick();
                    if !thread_flag.wait_tick(TICK_PERIOD) {
                        break;
                    }
                }
                // 退出前清掉计时行，后续输出不会与之交错
                bar.finish_and_clear();
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!("无法启动计时器线程: {}", err);
                None
            }
        };

        Self { id, flag, handle }
    }

    /// 创建计时显示
    fn create_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} 运行时间: {msg} | 正在扫描文件...")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb
    }

    /// 停止计时器并等待线程退出；可重复调用
    pub fn stop(&mut self) {
        self.flag.request_stop();
        self.release_display();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("计时器线程异常退出");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.flag.is_running()
    }

    /// 只清除自己登记的显示
    fn release_display(&self) {
        let mut active = ACTIVE_SPINNER.lock().unwrap_or_else(|e| e.into_inner());
        if matches!(active.as_ref(), Some((id, _)) if *id == self.id) {
            *active = None;
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_is_idempotent() {
        let signal = CancellationSignal::new();
        let mut timer = CountdownTimer::start(&signal);
        assert!(timer.is_running());

        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
    }

    #[test]
    fn test_stop_wakes_thread_promptly() {
        let signal = CancellationSignal::new();
        let mut timer = CountdownTimer::start(&signal);

        let started = Instant::now();
        timer.stop();
        assert!(started.elapsed() < TICK_PERIOD);
    }

    #[test]
    fn test_cancellation_requests_stop() {
        let signal = CancellationSignal::new();
        let mut timer = CountdownTimer::start(&signal);

        signal.cancel();
        assert!(!timer.is_running());
        timer.stop();
    }

    #[test]
    fn test_suspend_spinner_runs_closure() {
        assert_eq!(suspend_spinner(|| 7), 7);

        let signal = CancellationSignal::new();
        let mut timer = CountdownTimer::start(&signal);
        assert_eq!(suspend_spinner(|| "logged"), "logged");
        timer.stop();
        assert_eq!(suspend_spinner(|| 1 + 1), 2);
    }

    #[test]
    fn test_wait_tick_times_out_while_running() {
        let flag = StopFlag::new();
        assert!(flag.wait_tick(Duration::from_millis(10)));

        flag.request_stop();
        assert!(!flag.wait_tick(Duration::from_secs(5)));
    }
}
