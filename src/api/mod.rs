// ==========================================
// 数据泵 - API 层
// ==========================================
// 职责: 工作簿级调度入口，供 CLI 与嵌入方调用
// ==========================================

pub mod data_pump_api;
pub mod error;

// 重导出核心类型
pub use data_pump_api::{DataPumpApi, MISSING_COLUMN};
pub use error::{DataPumpError, DataPumpResult};
