// ==========================================
// 数据泵 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 只表达整表失败；行级问题以 FieldError 数据返回
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 工作表结构错误 =====
    #[error("Following column headers not found: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("工作表需成对导入 (sheet={sheet}, missing={missing})")]
    UnpairedSheet { sheet: String, missing: String },

    // ===== 数据访问错误 =====
    #[error("名称查找表加载失败 (table={table}): {source}")]
    LookupFailed {
        table: String,
        #[source]
        source: RepositoryError,
    },

    #[error("存储错误: {0}")]
    Repository(#[from] RepositoryError),
}

impl ImportError {
    /// 缺失列（表头未找到时单元格错误使用）
    pub fn missing_columns(&self) -> &[String] {
        match self {
            ImportError::MissingColumns(columns) => columns,
            _ => &[],
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
