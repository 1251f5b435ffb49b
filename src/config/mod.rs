pub mod defaults;
pub mod settings;

pub use settings::{Config, ReportConfig, SafetyConfig, ScanConfig};
