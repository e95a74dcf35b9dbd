// ==========================================
// 数据泵 - 单元格与工作表行
// ==========================================
// 职责: 工作簿单元格值、按表头索引的数据行、导出行
// 红线: 不含校验规则，不含存储逻辑
// ==========================================

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

// ==========================================
// CellValue - 单元格值
// ==========================================
/// 工作簿单元格值（读入与导出共用）
///
/// 导出时布尔值已被转换为 `Text("TRUE"/"FALSE")`，空值序列化为 `""`。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// 单元格的文本形式（校验与类型转换都基于此）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => bool_token(*b).to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_str(""),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// 布尔值在工作簿中的字面量
pub fn bool_token(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// 数值格式化：整数值不带小数部分（`3.0` → `"3"`）
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ==========================================
// SheetRow - 按表头索引的数据行
// ==========================================
/// 解析后的数据行（表头文本 → 单元格）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    pub cells: HashMap<String, CellValue>,
}

impl SheetRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 (表头, 值) 对构造
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    /// 读取单元格文本，缺失视为空
    pub fn text(&self, header: &str) -> String {
        self.cells.get(header).map(|c| c.as_text()).unwrap_or_default()
    }

    pub fn insert<V: Into<CellValue>>(&mut self, header: &str, value: V) {
        self.cells.insert(header.to_string(), value.into());
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|c| c.is_empty())
    }
}

// ==========================================
// RawSheet - 解析后的工作表
// ==========================================
/// 工作簿中的一张表（表头顺序保留）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<SheetRow>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// 表头在本表中的列序号
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

/// 导出行：与调用方给定的表头顺序逐位对应
pub type DataPumpRow = Vec<CellValue>;
