pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod operations;
pub mod report;
pub mod runtime;
pub mod safety;
pub mod scanner;
pub mod utils;

// 重新导出常用类型
pub use app::{App, DeletionMode, RunOptions, RunReport, ValidationError};
pub use models::{CompletionStatus, FileRecord, ScanStats};
pub use runtime::CancellationSignal;
