// ==========================================
// 数据泵 - 配置读取 Trait
// ==========================================
// 职责: 定义导入/导出所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

pub type ConfigError = Box<dyn Error + Send + Sync>;

/// 数据泵运行参数快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPumpConfig {
    /// 同一依赖层内并发导入的工作表数（导出同样适用）
    pub sheet_concurrency: usize,
    /// 无顺序依赖校验的工作表，并行落库的行数
    pub persist_parallelism: usize,
    /// 单表处理期限（毫秒）
    pub row_timeout_ms: Option<u64>,
    /// 记录无自身时区时使用的 IANA 时区
    pub default_timezone: String,
}

impl Default for DataPumpConfig {
    fn default() -> Self {
        Self {
            sheet_concurrency: 4,
            persist_parallelism: 1,
            row_timeout_ms: None,
            default_timezone: "UTC".to_string(),
        }
    }
}

// ==========================================
// DataPumpConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait DataPumpConfigReader: Send + Sync {
    /// 获取工作表并发数
    ///
    /// # 默认值
    /// - 4
    async fn get_sheet_concurrency(&self) -> Result<usize, ConfigError>;

    /// 获取落库并行度
    ///
    /// # 默认值
    /// - 1（逐行顺序落库）
    async fn get_persist_parallelism(&self) -> Result<usize, ConfigError>;

    /// 获取单表处理期限
    ///
    /// # 默认值
    /// - None（不限时）
    async fn get_row_timeout_ms(&self) -> Result<Option<u64>, ConfigError>;

    /// 获取默认时区
    ///
    /// # 默认值
    /// - UTC
    async fn get_default_timezone(&self) -> Result<String, ConfigError>;

    /// 读取全部参数
    async fn load_data_pump_config(&self) -> Result<DataPumpConfig, ConfigError> {
        Ok(DataPumpConfig {
            sheet_concurrency: self.get_sheet_concurrency().await?,
            persist_parallelism: self.get_persist_parallelism().await?,
            row_timeout_ms: self.get_row_timeout_ms().await?,
            default_timezone: self.get_default_timezone().await?,
        })
    }
}
