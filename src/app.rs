use std::any::Any;
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Result};
use thiserror::Error;

use crate::config::Config;
use crate::models::{FileRecord, RunOutcome, ScanStats, StatsSnapshot};
use crate::operations::DeletionController;
use crate::report::{render_top_files, ReportGenerator};
use crate::runtime::{CancellationSignal, CountdownTimer};
use crate::safety::SafetyClassifier;
use crate::scanner::FileScanner;
use crate::utils::format_size;

/// 1 GB 对应的字节数
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// 扫描开始前的校验错误，属于致命错误
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("目标目录不存在: {}", .0.display())]
    NotFound(PathBuf),

    #[error("目标路径不是目录: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("无法解析目标目录 {}: {source}", .path.display())]
    Unresolvable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("最小文件大小必须大于 0，当前为 {0}")]
    InvalidThreshold(f64),
}

/// 删除方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionMode {
    /// 逐个确认
    Interactive,
    /// 无人值守批量删除
    Batch,
}

/// 一次运行的参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target: PathBuf,
    pub min_size_gb: f64,
    pub mode: DeletionMode,
    pub dry_run: bool,
}

/// 一次运行的结果
#[derive(Debug)]
pub struct RunReport {
    /// 最终统计快照
    pub stats: StatsSnapshot,

    /// 扫描得到的记录（扫描顺序）
    pub records: Vec<FileRecord>,

    /// summary JSON 的路径（写入失败时为 None）
    pub summary_path: Option<PathBuf>,
}

/// 把 GB 数换算为字节，非正数或非有限值视为无效
///
/// 极小的正数至少换算为 1 字节，空文件不会被当作大文件。
pub fn threshold_bytes(size_gb: f64) -> Result<u64, ValidationError> {
    if !size_gb.is_finite() || size_gb <= 0.0 {
        return Err(ValidationError::InvalidThreshold(size_gb));
    }
    Ok(((size_gb * BYTES_PER_GB) as u64).max(1))
}

/// 展开 `~` 并校验目标目录
pub fn resolve_target(raw: &Path) -> Result<PathBuf, ValidationError> {
    let expanded = match raw.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| raw.to_path_buf()),
        Err(_) => raw.to_path_buf(),
    };

    if !expanded.exists() {
        return Err(ValidationError::NotFound(expanded));
    }
    if !expanded.is_dir() {
        return Err(ValidationError::NotADirectory(expanded));
    }

    expanded
        .canonicalize()
        .map_err(|source| ValidationError::Unresolvable { path: expanded, source })
}

/// 运行控制器 - 串起扫描、删除和报告
///
/// 拥有唯一的 [`ScanStats`]；无论运行如何结束，报告阶段都会执行。
pub struct App {
    config: Config,
    target: PathBuf,
    min_size_bytes: u64,
    mode: DeletionMode,
    dry_run: bool,
    cancellation: CancellationSignal,
    log_file: Option<PathBuf>,
}

impl App {
    /// 校验参数并创建运行控制器
    pub fn new(
        config: Config,
        options: RunOptions,
        cancellation: CancellationSignal,
    ) -> Result<Self, ValidationError> {
        let min_size_bytes = threshold_bytes(options.min_size_gb)?;
        let target = resolve_target(&options.target)?;

        Ok(Self {
            config,
            target,
            min_size_bytes,
            mode: options.mode,
            dry_run: options.dry_run,
            cancellation,
            log_file: None,
        })
    }

    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }

    /// 无人值守的真实删除需要事先确认
    pub fn needs_confirmation(&self) -> bool {
        self.mode == DeletionMode::Batch && !self.dry_run
    }

    /// 记录本次运行的参数
    pub fn log_banner(&self) {
        let rule = "=".repeat(60);
        tracing::info!("{}", rule);
        tracing::info!("大文件清理工具启动");
        tracing::info!("目标目录: {}", self.target.display());
        tracing::info!("最小文件大小: {:.2} GB", self.min_size_bytes as f64 / BYTES_PER_GB);
        tracing::info!("交互模式: {}", self.mode == DeletionMode::Interactive);
        tracing::info!("演练模式: {}", self.dry_run);
        tracing::info!("{}", rule);
    }

    /// 执行一次完整的运行
    ///
    /// 致命错误（包括 panic）会把状态置为 Error，在报告生成之后再返回。
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<RunReport> {
        let mut stats = ScanStats::new();
        let mut records = Vec::new();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.execute(&mut stats, &mut records, input, &mut output)
        }));

        let (outcome, fault) = match result {
            Ok(Ok(())) => (RunOutcome::Finished, None),
            Ok(Err(err)) => {
                tracing::error!("运行时发生致命错误: {:#}", err);
                (RunOutcome::Faulted, Some(err))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("运行时发生未处理的异常: {}", message);
                (RunOutcome::Faulted, Some(anyhow!("运行时发生未处理的异常: {}", message)))
            }
        };

        if self.cancellation.is_cancelled() {
            stats.mark_interrupted();
        }
        stats.finalize(outcome);

        let summary_path = ReportGenerator::new(&self.config.report.log_dir, &self.target)
            .with_log_file(self.log_file.clone())
            .generate(&stats, &mut output);

        match fault {
            Some(err) => Err(err),
            None => Ok(RunReport {
                stats: stats.snapshot(),
                records,
                summary_path,
            }),
        }
    }

    fn execute<R: BufRead, W: Write>(
        &self,
        stats: &mut ScanStats,
        records: &mut Vec<FileRecord>,
        input: R,
        output: &mut W,
    ) -> Result<()> {
        tracing::info!("🔍 开始扫描文件...");

        let scanner = FileScanner::with_config(self.min_size_bytes, &self.config.scan);
        let mut timer = CountdownTimer::start(&self.cancellation);
        *records = scanner.scan(&self.target, stats, &self.cancellation);
        timer.stop();

        tracing::info!(
            "📊 扫描完成，共扫描 {} 个文件，发现 {} 个大文件",
            stats.files_scanned,
            stats.large_files_found
        );

        write!(output, "{}", render_top_files(records, self.config.report.top_files))?;
        output.flush()?;

        if self.cancellation.is_cancelled() {
            stats.mark_interrupted();
            return Ok(());
        }

        let classifier = SafetyClassifier::from_config(&self.config.safety);
        let controller = DeletionController::new(&classifier, &self.cancellation, self.dry_run);

        let summary = match self.mode {
            DeletionMode::Interactive => {
                controller.run_interactive(records, stats, input, &mut *output)?
            }
            DeletionMode::Batch => controller.run_batch(records, stats),
        };

        tracing::info!(
            "删除阶段结束: 删除 {} 个，跳过不安全 {} 个，失败 {} 个，释放 {}",
            summary.deleted,
            summary.unsafe_skipped,
            summary.failed,
            format_size(stats.bytes_freed)
        );
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知异常".to_string()
    }
}
