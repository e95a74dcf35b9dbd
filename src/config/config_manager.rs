// ==========================================
// 数据泵 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::data_pump_config_trait::{ConfigError, DataPumpConfigReader};
use crate::db::open_sqlite_connection;
use crate::domain::calendar::parse_timezone;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, ConfigError> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ConfigError> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析配置值；格式错误视为配置错误
    fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
    {
        match self.get_config_value(key)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| format!("配置值格式错误: {}={}", key, raw).into()),
        }
    }
}

// ==========================================
// DataPumpConfigReader 实现
// ==========================================
#[async_trait]
impl DataPumpConfigReader for ConfigManager {
    async fn get_sheet_concurrency(&self) -> Result<usize, ConfigError> {
        let value = self.get_parsed::<usize>(config_keys::SHEET_CONCURRENCY)?;
        Ok(value.unwrap_or(4).max(1))
    }

    async fn get_persist_parallelism(&self) -> Result<usize, ConfigError> {
        let value = self.get_parsed::<usize>(config_keys::PERSIST_PARALLELISM)?;
        Ok(value.unwrap_or(1).max(1))
    }

    async fn get_row_timeout_ms(&self) -> Result<Option<u64>, ConfigError> {
        self.get_parsed::<u64>(config_keys::ROW_TIMEOUT_MS)
    }

    async fn get_default_timezone(&self) -> Result<String, ConfigError> {
        let value = self
            .get_config_value(config_keys::DEFAULT_TIMEZONE)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "UTC".to_string());

        if parse_timezone(&value).is_none() {
            return Err(format!("无效的默认时区: {}", value).into());
        }
        Ok(value)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 并发
    pub const SHEET_CONCURRENCY: &str = "data_pump/sheet_concurrency";
    pub const PERSIST_PARALLELISM: &str = "data_pump/persist_parallelism";

    // 期限
    pub const ROW_TIMEOUT_MS: &str = "data_pump/row_timeout_ms";

    // 时区
    pub const DEFAULT_TIMEZONE: &str = "data_pump/default_timezone";
}
