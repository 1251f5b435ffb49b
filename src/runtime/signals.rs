use tokio::task::JoinHandle;

use crate::runtime::CancellationSignal;

/// 启动信号监听任务
///
/// 收到 Ctrl-C（Unix 下还有 SIGTERM）时只设置取消标志，
/// 主流程会在下一个检查点停下并照常生成报告。之后的信号同样只记录日志，不会绕过报告。
pub fn spawn_signal_listener(signal: CancellationSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(err) = wait_for_shutdown_signal().await {
                tracing::warn!("无法监听中断信号: {}", err);
                return;
            }

            if signal.is_cancelled() {
                tracing::warn!("已在停止中，正在生成报告...");
            } else {
                tracing::warn!("收到中断信号，将在当前文件处理完后停止");
            }
            signal.cancel();
        }
    })
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
