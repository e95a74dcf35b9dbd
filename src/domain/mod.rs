// ==========================================
// 数据泵 - 领域模型层
// ==========================================
// 职责: 单元格/行、流转实体、日期时区工具、导入导出结果
// 红线: 不含数据访问逻辑，不含校验规则
// ==========================================

pub mod calendar;
pub mod cell;
pub mod entity;
pub mod outcome;

// 重导出核心类型
pub use cell::{CellValue, DataPumpRow, RawSheet, SheetRow};
pub use entity::Entity;
pub use outcome::{
    DataPump, ExportBatch, FieldError, FieldErrorKind, ImportOutcome, InvalidCell, InvalidField,
    RowValidationResult, SheetFailure, WorkbookImportReport,
};
