// ==========================================
// 数据泵 - 配置层
// ==========================================
// 职责: 运行参数管理（并发、期限、默认时区）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod data_pump_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use data_pump_config_trait::{ConfigError, DataPumpConfig, DataPumpConfigReader};
