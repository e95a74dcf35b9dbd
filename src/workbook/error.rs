// ==========================================
// 数据泵 - 工作簿读写错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 工作簿读写错误
#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.xlsm/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("Excel 写入失败: {0}")]
    ExcelWriteError(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for WorkbookError {
    fn from(err: std::io::Error) -> Self {
        WorkbookError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for WorkbookError {
    fn from(err: csv::Error) -> Self {
        WorkbookError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for WorkbookError {
    fn from(err: calamine::Error) -> Self {
        WorkbookError::ExcelParseError(err.to_string())
    }
}

// 实现 From<rust_xlsxwriter::XlsxError>
impl From<rust_xlsxwriter::XlsxError> for WorkbookError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        WorkbookError::ExcelWriteError(err.to_string())
    }
}

/// Result 类型别名
pub type WorkbookResult<T> = Result<T, WorkbookError>;
