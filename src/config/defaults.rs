use std::collections::HashSet;
use std::path::PathBuf;

pub struct DefaultConfig;

impl DefaultConfig {
    /// 扫描时不进入的目录名（虚拟文件系统和系统保留目录）
    pub fn default_skip_dirs() -> HashSet<String> {
        ["System", "private", "dev", "proc", "sys"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// 默认的系统关键路径片段，按小写子串匹配
    pub fn default_critical_paths() -> Vec<String> {
        [
            "/system/",
            "/usr/bin/",
            "/usr/sbin/",
            "/bin/",
            "/sbin/",
            "/library/application support/",
            "/library/frameworks/",
            "/library/system/",
            "/private/var/db/",
            "/private/etc/",
            "/applications/",
            "/library/preferences/",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// 默认的系统文件扩展名（不带点）
    pub fn default_system_extensions() -> HashSet<String> {
        ["dylib", "framework", "kext", "plist"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// 默认的日志与报告目录
    pub fn default_log_dir() -> PathBuf {
        PathBuf::from("cleanup_logs")
    }
}
