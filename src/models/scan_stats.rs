use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;

/// 运行的最终状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    Incomplete,
    Completed,
    Interrupted,
    Error,
}

impl CompletionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CompletionStatus::Incomplete)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CompletionStatus::Incomplete => "INCOMPLETE",
            CompletionStatus::Completed => "COMPLETED",
            CompletionStatus::Interrupted => "INTERRUPTED",
            CompletionStatus::Error => "ERROR",
        }
    }
}

/// 顶层运行是如何结束的
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// 所有阶段都执行完毕（可能中途收到取消信号）
    Finished,

    /// 有未处理的故障传播到了顶层
    Faulted,
}

/// 错误分类，在出错的那一刻确定，之后不再改变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Permission,
    Io,
    Other,
}

impl ErrorKind {
    /// 对 I/O 错误分类
    pub fn classify_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => ErrorKind::Permission,
            _ => ErrorKind::Io,
        }
    }

    /// 对遍历错误分类；没有底层 I/O 错误的（如符号链接循环）归为 Other
    pub fn classify_walk(err: &walkdir::Error) -> Self {
        match err.io_error() {
            Some(io_err) => Self::classify_io(io_err),
            None => ErrorKind::Other,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ErrorKind::Permission => "权限不足",
            ErrorKind::Io => "系统 I/O 错误",
            ErrorKind::Other => "未知错误",
        }
    }
}

/// 运行统计
///
/// 只由主流程写入（扫描器和删除控制器通过 `&mut` 借用），因此不需要任何锁。
#[derive(Debug, Clone)]
pub struct ScanStats {
    /// 运行开始时间
    pub start_time: DateTime<Local>,

    /// 已扫描的文件数量
    pub files_scanned: u64,

    /// 已扫描的目录数量
    pub directories_scanned: u64,

    /// 发现的大文件数量
    pub large_files_found: u64,

    /// 已删除（或演练模式下模拟删除）的文件数量
    pub files_deleted: u64,

    /// 释放的空间（字节），使用扫描时的文件大小
    pub bytes_freed: u64,

    pub permission_errors: u64,
    pub io_errors: u64,
    pub other_errors: u64,

    /// 是否观察到了取消信号
    pub interrupted: bool,

    completion_status: CompletionStatus,
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanStats {
    /// 创建新的统计，状态为 Incomplete
    pub fn new() -> Self {
        Self {
            start_time: Local::now(),
            files_scanned: 0,
            directories_scanned: 0,
            large_files_found: 0,
            files_deleted: 0,
            bytes_freed: 0,
            permission_errors: 0,
            io_errors: 0,
            other_errors: 0,
            interrupted: false,
            completion_status: CompletionStatus::Incomplete,
        }
    }

    /// 按分类累计一次错误
    pub fn record_error(&mut self, kind: ErrorKind) {
        match kind {
            ErrorKind::Permission => self.permission_errors += 1,
            ErrorKind::Io => self.io_errors += 1,
            ErrorKind::Other => self.other_errors += 1,
        }
    }

    /// 记录一次（真实或模拟的）删除
    pub fn record_deletion(&mut self, bytes: u64) {
        self.files_deleted += 1;
        self.bytes_freed += bytes;
    }

    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    /// 错误总数，只在需要时计算
    pub fn errors_total(&self) -> u64 {
        self.permission_errors + self.io_errors + self.other_errors
    }

    pub fn completion_status(&self) -> CompletionStatus {
        self.completion_status
    }

    /// 设置最终状态，只生效一次；已经是终态时直接返回当前状态
    pub fn finalize(&mut self, outcome: RunOutcome) -> CompletionStatus {
        if self.completion_status.is_terminal() {
            return self.completion_status;
        }

        self.completion_status = match outcome {
            RunOutcome::Faulted => CompletionStatus::Error,
            RunOutcome::Finished if self.interrupted => CompletionStatus::Interrupted,
            RunOutcome::Finished => CompletionStatus::Completed,
        };
        self.completion_status
    }

    /// 从开始到现在经过的时间
    pub fn elapsed(&self) -> Duration {
        Local::now()
            .signed_duration_since(self.start_time)
            .to_std()
            .unwrap_or_default()
    }

    /// 生成可序列化的快照，运行时长在调用时计算
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            start_time: self.start_time,
            runtime_seconds: self.elapsed().as_secs_f64(),
            completion_status: self.completion_status,
            files_scanned: self.files_scanned,
            files_deleted: self.files_deleted,
            bytes_freed: self.bytes_freed,
            large_files_found: self.large_files_found,
            directories_scanned: self.directories_scanned,
            errors: ErrorBreakdown {
                total: self.errors_total(),
                permission_errors: self.permission_errors,
                io_errors: self.io_errors,
                other_errors: self.other_errors,
            },
            interrupted: self.interrupted,
        }
    }
}

/// 写入 summary JSON 的统计快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub start_time: DateTime<Local>,
    pub runtime_seconds: f64,
    pub completion_status: CompletionStatus,
    pub files_scanned: u64,
    pub files_deleted: u64,
    pub bytes_freed: u64,
    pub large_files_found: u64,
    pub directories_scanned: u64,
    pub errors: ErrorBreakdown,
    pub interrupted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBreakdown {
    pub total: u64,
    pub permission_errors: u64,
    pub io_errors: u64,
    pub other_errors: u64,
}
