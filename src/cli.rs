use clap::Parser;
use std::path::PathBuf;

use crate::app::{DeletionMode, RunOptions};
use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "large-file-cleanup")]
#[command(about = "查找并安全清理大文件")]
#[command(version)]
#[command(after_help = "示例:
  large-file-cleanup ~/Downloads
  large-file-cleanup ~ --size 2.5 --non-interactive
  large-file-cleanup /Volumes/ExternalDrive --dry-run")]
pub struct Cli {
    /// 要扫描的目标目录
    pub directory: PathBuf,

    /// 最小文件大小（GB）
    #[arg(short, long, default_value_t = 1.0, value_parser = parse_size_gb, allow_negative_numbers = true)]
    pub size: f64,

    /// 非交互模式（自动删除所有安全的文件）
    #[arg(short = 'n', long)]
    pub non_interactive: bool,

    /// 演练模式，只显示将要删除的文件
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// 跳过非交互删除前的确认
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 日志和汇总报告的输出目录
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// 显示最大文件的数量
    #[arg(long)]
    pub top: Option<usize>,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 命令行参数覆盖配置文件中的值
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(log_dir) = &self.log_dir {
            config.report.log_dir = log_dir.clone();
        }
        if let Some(top) = self.top {
            config.report.top_files = top;
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            target: self.directory.clone(),
            min_size_gb: self.size,
            mode: if self.non_interactive {
                DeletionMode::Batch
            } else {
                DeletionMode::Interactive
            },
            dry_run: self.dry_run,
        }
    }
}

/// 解析最小文件大小，必须是大于 0 的有限数
fn parse_size_gb(value: &str) -> Result<f64, String> {
    let size: f64 = value
        .parse()
        .map_err(|_| format!("无效的数字: {}", value))?;
    if !size.is_finite() || size <= 0.0 {
        return Err(format!("文件大小必须大于 0，当前为 {}", value));
    }
    Ok(size)
}
