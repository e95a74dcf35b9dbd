// ==========================================
// 数据泵 - 调度层错误类型
// ==========================================
// 职责: 调度入口的错误类型
// 说明: 只有 Configuration 会以 Err 逃出调度器；
//       表级失败记录在报告的 errors 中
// ==========================================

use crate::exporter::error::ExportError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use crate::workbook::error::WorkbookError;
use thiserror::Error;

/// 调度层错误类型
#[derive(Error, Debug)]
pub enum DataPumpError {
    /// 致命配置错误（注册表依赖环、无效默认时区等）
    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("工作表未注册: {0}")]
    UnknownSheet(String),

    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("导出失败: {0}")]
    Export(#[from] ExportError),

    #[error("工作簿读写失败: {0}")]
    Workbook(#[from] WorkbookError),

    #[error("存储错误: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type DataPumpResult<T> = Result<T, DataPumpError>;
