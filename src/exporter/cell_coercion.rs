// ==========================================
// 数据泵 - 导出单元格转换
// ==========================================
// null → ""，布尔 → "TRUE"/"FALSE"，日期 → MM/DD/YYYY（记录时区）
// 数组 → 逗号连接，其余原样
// ==========================================

use crate::domain::calendar::{format_sheet_date, stored_timestamp_to_local_date};
use crate::domain::cell::{bool_token, format_number, CellValue};
use crate::schema::ColumnSpec;
use chrono_tz::Tz;
use serde_json::Value;

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(format_number),
        Value::Bool(b) => Some(bool_token(*b).to_string()),
        _ => None,
    }
}

/// 存储值 → 单元格
///
/// # 参数
/// - column: 所属列；未知表头传 None
/// - tz: 记录时区（日期列使用）
pub fn to_cell(column: Option<&ColumnSpec>, value: &Value, tz: Tz) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::text(bool_token(*b)),
        Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
        Value::String(s) if column.map(|c| c.is_date()).unwrap_or(false) => {
            stored_timestamp_to_local_date(s, tz)
                .map(|date| CellValue::text(format_sheet_date(date)))
                .unwrap_or_else(|| CellValue::from(s.as_str()))
        }
        Value::String(s) => CellValue::from(s.as_str()),
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(scalar_text).collect();
            CellValue::from(joined.join(", "))
        }
        Value::Object(_) => CellValue::from(value.to_string()),
    }
}
