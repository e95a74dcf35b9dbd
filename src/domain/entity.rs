// ==========================================
// 数据泵 - 实体表示
// ==========================================
// 导入管道中实体以 JSON 对象流转:
// - 校验后: 表头 → 类型化值
// - 前置解析后: 追加注入的 id 字段
// - 落库前: 表头改写为 DB 字段、嵌套对象折叠
// ==========================================

use crate::domain::cell::format_number;
use serde_json::{Map, Value};

/// 流转中的实体
pub type Entity = Map<String, Value>;

/// 读取实体字段的文本形式（空串视为 None）
pub fn text_of(entity: &Entity, field: &str) -> Option<String> {
    let text = match entity.get(field)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.as_f64().map(format_number)?,
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// 读取实体字段的数值
pub fn number_of(entity: &Entity, field: &str) -> Option<f64> {
    match entity.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 把 f64 转为 JSON 数值（整数值保存为整数）
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// 逗号分隔的多值字段拆分（去空白、去空项）
pub fn split_tokens(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_of() {
        let entity = json!({"a": " x ", "b": 3.0, "c": "", "d": ["p1", "p2"], "e": null});
        let entity = entity.as_object().unwrap();
        assert_eq!(text_of(entity, "a").as_deref(), Some("x"));
        assert_eq!(text_of(entity, "b").as_deref(), Some("3"));
        assert_eq!(text_of(entity, "c"), None);
        assert_eq!(text_of(entity, "d").as_deref(), Some("p1, p2"));
        assert_eq!(text_of(entity, "e"), None);
        assert_eq!(text_of(entity, "missing"), None);
    }

    #[test]
    fn test_split_tokens() {
        assert_eq!(split_tokens(" pool, gym ,, spa"), vec!["pool", "gym", "spa"]);
        assert!(split_tokens(" ").is_empty());
    }
}
