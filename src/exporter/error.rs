// ==========================================
// 数据泵 - 导出模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导出模块错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("名称映射表加载失败 (table={table}): {source}")]
    LookupFailed {
        table: String,
        #[source]
        source: RepositoryError,
    },

    #[error("存储错误: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
