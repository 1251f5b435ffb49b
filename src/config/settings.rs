use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

use crate::config::defaults::DefaultConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 扫描配置
    pub scan: ScanConfig,

    /// 安全规则
    pub safety: SafetyConfig,

    /// 报告配置
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 不进入的目录名（隐藏目录总是跳过）
    pub skip_directories: HashSet<String>,

    /// 是否跟随符号链接
    pub follow_symlinks: bool,

    /// 每扫描多少个文件输出一次进度日志
    pub progress_interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// 系统关键路径片段（不区分大小写的子串匹配）
    pub critical_paths: Vec<String>,

    /// 系统文件扩展名
    pub system_extensions: HashSet<String>,

    /// 是否保护隐藏文件
    pub protect_hidden_files: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 运行日志和 summary JSON 的输出目录
    pub log_dir: PathBuf,

    /// 显示最大文件的数量
    pub top_files: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skip_directories: DefaultConfig::default_skip_dirs(),
            follow_symlinks: false,
            progress_interval: 1000,
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            critical_paths: DefaultConfig::default_critical_paths(),
            system_extensions: DefaultConfig::default_system_extensions(),
            protect_hidden_files: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_dir: DefaultConfig::default_log_dir(),
            top_files: 10,
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("配置文件格式错误: {}", path.display()))?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("无法找到配置目录"))?;
        path.push("large-file-cleanup");
        path.push("config.toml");
        Ok(path)
    }

    /// 加载配置，如果文件不存在则创建默认配置
    pub fn load_or_create_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            if let Err(err) = config.save_to_file(&config_path) {
                // 无法写入配置目录时仍使用默认配置运行
                tracing::debug!("无法保存默认配置 {}: {}", config_path.display(), err);
            }
            Ok(config)
        }
    }
}
