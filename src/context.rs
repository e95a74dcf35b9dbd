// ==========================================
// 数据泵 - 运行上下文
// ==========================================
// 职责: 一次导入/导出调用所需的共享依赖
// - 存储实现
// - 运行参数快照
// - 当前时刻（可注入，测试使用固定时刻）
// ==========================================

use crate::api::error::{DataPumpError, DataPumpResult};
use crate::config::DataPumpConfig;
use crate::domain::calendar::parse_timezone;
use crate::repository::Storage;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

#[derive(Clone)]
pub struct PumpContext {
    pub storage: Arc<dyn Storage>,
    pub config: DataPumpConfig,
    pub default_timezone: Tz,
    pub now: DateTime<Utc>,
}

impl PumpContext {
    /// 创建上下文
    ///
    /// # 返回
    /// - Err(Configuration): 默认时区无效
    pub fn new(storage: Arc<dyn Storage>, config: DataPumpConfig) -> DataPumpResult<Self> {
        let default_timezone = parse_timezone(&config.default_timezone).ok_or_else(|| {
            DataPumpError::Configuration(format!("无效的默认时区: {}", config.default_timezone))
        })?;
        Ok(Self {
            storage,
            config,
            default_timezone,
            now: Utc::now(),
        })
    }

    /// 固定当前时刻
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}
