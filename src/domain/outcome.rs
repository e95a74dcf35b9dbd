// ==========================================
// 数据泵 - 导入/导出结果对象
// ==========================================
// 职责: 行级错误、表级结果、批量导出结果
// 红线: 行级问题一律作为数据返回，不走 Err
// ==========================================

use crate::domain::cell::DataPumpRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// 行级错误
// ==========================================

/// 行级错误的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldErrorKind {
    /// 字段语法规则未通过
    Field,
    /// 名称引用未解析
    Prerequisite,
    /// 跨行/业务规则
    Custom,
    /// 落库失败（约束冲突等）
    Persistence,
}

/// 单个字段的错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_name: String,
    pub message: String,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn field(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field_name, message, FieldErrorKind::Field)
    }

    pub fn prerequisite(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field_name, message, FieldErrorKind::Prerequisite)
    }

    pub fn custom(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field_name, message, FieldErrorKind::Custom)
    }

    pub fn persistence(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field_name, message, FieldErrorKind::Persistence)
    }

    fn new(field_name: impl Into<String>, message: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
            kind,
        }
    }
}

/// 单行校验结果（仅在一行的处理过程中存在）
#[derive(Debug, Clone, PartialEq)]
pub struct RowValidationResult {
    pub row_index: usize,
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl RowValidationResult {
    pub fn new(row_index: usize, errors: Vec<FieldError>) -> Self {
        Self {
            row_index,
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// 汇总到表级结果中的无效字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidField {
    /// 工作表行号（表头为第 0 行）
    pub row_index: usize,
    pub field_name: String,
    pub message: String,
    pub kind: FieldErrorKind,
}

// ==========================================
// 表级结果
// ==========================================

/// 单表导入结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub invalid_fields: Vec<InvalidField>,
    /// 成功落库的行数
    pub persisted_rows: usize,
    /// 因超时未处理的行数
    pub skipped_rows: usize,
}

impl ImportOutcome {
    /// 收集一行的校验结果
    pub fn record_row(&mut self, result: RowValidationResult) {
        for error in result.errors {
            self.invalid_fields.push(InvalidField {
                row_index: result.row_index,
                field_name: error.field_name,
                message: error.message,
                kind: error.kind,
            });
        }
    }

    pub fn is_clean(&self) -> bool {
        self.invalid_fields.is_empty() && self.skipped_rows == 0
    }
}

/// 可定位到单元格的错误（工作簿导入报告使用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidCell {
    pub sheet_name: String,
    pub row: usize,
    /// 本表中的列序号；表头缺失时为 None
    pub column: Option<usize>,
    pub field_name: String,
    pub comment: String,
}

/// 整表失败（不影响其他表）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetFailure {
    pub sheet_name: String,
    pub error: String,
}

// ==========================================
// 导出结果
// ==========================================

/// 单表导出数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPump {
    pub sheet_name: String,
    pub column_headers: Vec<String>,
    pub data: Vec<DataPumpRow>,
}

/// 批量导出结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBatch {
    pub data_pumps: Vec<DataPump>,
    pub errors: Vec<SheetFailure>,
}

/// 工作簿导入报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookImportReport {
    pub invalid_cells: Vec<InvalidCell>,
    /// 各表成功落库行数
    pub entity_counts: BTreeMap<String, usize>,
    /// 各表导入时的表头顺序（供回导使用）
    pub column_headers: BTreeMap<String, Vec<String>>,
    pub errors: Vec<SheetFailure>,
}

impl WorkbookImportReport {
    pub fn has_errors(&self) -> bool {
        !self.invalid_cells.is_empty() || !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_row_flattens_errors() {
        let mut outcome = ImportOutcome::default();
        outcome.record_row(RowValidationResult::new(
            3,
            vec![
                FieldError::field("name", "FIELD_REQUIRED"),
                FieldError::prerequisite("property", "ELEMENT_DOESNT_EXIST: P9"),
            ],
        ));
        outcome.record_row(RowValidationResult::new(4, vec![]));
        assert_eq!(outcome.invalid_fields.len(), 2);
        assert!(outcome.invalid_fields.iter().all(|f| f.row_index == 3));
        assert_eq!(outcome.invalid_fields[1].kind, FieldErrorKind::Prerequisite);
        assert!(!outcome.is_clean());
    }
}
