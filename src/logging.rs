use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use chrono::Local;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::fmt;

use crate::runtime::suspend_spinner;

/// 终端日志输出，写入时先让出计时器所在的行
struct ConsoleWriter;

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        suspend_spinner(|| io::stdout().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// 初始化全局日志：终端输出加上带时间戳的运行日志文件
///
/// 返回日志文件路径；无法创建日志文件时只输出到终端，返回 `None`。
pub fn init(log_dir: &Path, verbose: bool) -> Option<PathBuf> {
    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_layer = fmt::layer()
        .with_writer(|| ConsoleWriter)
        .with_target(false)
        .with_filter(console_level);

    match create_log_file(log_dir) {
        Ok((path, file)) => {
            let file_layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(LevelFilter::INFO);

            let installed = tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .try_init();
            if installed.is_err() {
                return None;
            }
            Some(path)
        }
        Err(err) => {
            let _ = tracing_subscriber::registry().with(console_layer).try_init();
            tracing::warn!("无法创建日志文件，只输出到终端: {}", err);
            None
        }
    }
}

fn create_log_file(log_dir: &Path) -> std::io::Result<(PathBuf, File)> {
    fs::create_dir_all(log_dir)?;
    let file_name = format!("file_cleanup_{}.log", Local::now().format("%Y%m%d_%H%M%S"));
    let path = log_dir.join(file_name);
    let file = File::create(&path)?;
    Ok((path, file))
}
