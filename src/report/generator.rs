use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;
use anyhow::{Context, Result};
use chrono::Local;

use crate::models::{ScanStats, StatsSnapshot};
use crate::utils::{format_elapsed, format_size};

/// 报告生成器 - 输出汇总报告并保存 summary JSON
pub struct ReportGenerator {
    /// summary JSON 的输出目录
    log_dir: PathBuf,

    /// 扫描的目标目录
    target: PathBuf,

    /// 本次运行的日志文件
    log_file: Option<PathBuf>,
}

impl ReportGenerator {
    pub fn new(log_dir: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            target: target.into(),
            log_file: None,
        }
    }

    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }

    /// 生成报告：输出汇总、把快照写入日志和 JSON 文件
    ///
    /// 报告阶段本身的失败只记录日志，不会向上传播。返回 JSON 文件路径。
    pub fn generate<W: io::Write>(&self, stats: &ScanStats, output: &mut W) -> Option<PathBuf> {
        let snapshot = stats.snapshot();

        Self::emit(output, &self.render_summary(&snapshot));

        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => tracing::info!("清理汇总:\n{}", json),
            Err(err) => tracing::error!("无法序列化汇总: {}", err),
        }

        match self.write_json(&snapshot) {
            Ok(path) => {
                Self::emit(output, &format!("📄 汇总 JSON: {}", path.display()));
                Some(path)
            }
            Err(err) => {
                tracing::error!("保存汇总 JSON 失败: {:#}", err);
                None
            }
        }
    }

    fn emit<W: io::Write>(output: &mut W, text: &str) {
        if let Err(err) = writeln!(output, "{}", text).and_then(|_| output.flush()) {
            tracing::warn!("无法输出汇总报告: {}", err);
        }
    }

    /// 生成给人看的汇总报告
    pub fn render_summary(&self, snapshot: &StatsSnapshot) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);
        let runtime = std::time::Duration::from_secs_f64(snapshot.runtime_seconds.max(0.0));

        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "📋 清理汇总报告");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "状态: {}", snapshot.completion_status.display_name());
        let _ = writeln!(out, "运行时间: {}", format_elapsed(runtime));
        let _ = writeln!(out, "目标目录: {}", self.target.display());

        let _ = writeln!(out, "\n📊 统计:");
        let _ = writeln!(out, "  扫描文件数: {}", snapshot.files_scanned);
        let _ = writeln!(out, "  扫描目录数: {}", snapshot.directories_scanned);
        let _ = writeln!(out, "  发现大文件: {}", snapshot.large_files_found);
        let _ = writeln!(out, "  删除文件数: {}", snapshot.files_deleted);
        let _ = writeln!(out, "  释放空间: {}", format_size(snapshot.bytes_freed));

        if snapshot.errors.total > 0 {
            let _ = writeln!(out, "\n⚠️  遇到的错误:");
            let _ = writeln!(out, "  权限错误: {}", snapshot.errors.permission_errors);
            let _ = writeln!(out, "  I/O 错误: {}", snapshot.errors.io_errors);
            let _ = writeln!(out, "  其他错误: {}", snapshot.errors.other_errors);
            let _ = writeln!(out, "  错误总数: {}", snapshot.errors.total);
        }

        if snapshot.interrupted {
            let _ = writeln!(out, "\n⚠️  操作被中断");
        }

        if let Some(log_file) = &self.log_file {
            let _ = writeln!(out, "\n📝 日志文件: {}", log_file.display());
        }
        let _ = write!(out, "{}", rule);
        out
    }

    /// 把快照写入 `summary_<时间戳>.json`
    pub fn write_json(&self, snapshot: &StatsSnapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("无法创建报告目录: {}", self.log_dir.display()))?;

        let file_name = format!("summary_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
        let path = self.log_dir.join(file_name);

        let content = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, content)
            .with_context(|| format!("无法写入汇总文件: {}", path.display()))?;

        Ok(path)
    }
}
