// ==========================================
// 数据泵 - 导出实体整形
// ==========================================
// 职责: 存储记录（DB 字段）→ 按表头的值
// - 引用 id 还原为名称（id 列表以 ", " 连接）
// - 嵌套设置 / 嵌入对象展开回各自表头
// - DB 字段改名还原为表头
// ==========================================

use crate::domain::entity::Entity;
use crate::importer::prerequisite_resolver::lookup_key;
use crate::repository::LookupCache;
use crate::schema::{ColumnSpec, EntityShape, PrerequisiteSpec, SheetSchema};
use serde_json::Value;
use tracing::warn;

fn display_name(cache: &LookupCache, spec: &PrerequisiteSpec, id: &str) -> Option<String> {
    let name = cache.find_name(&lookup_key(spec), id).map(|s| s.to_string());
    if name.is_none() {
        warn!(table = spec.target_table, id = %id, "引用 id 无对应名称");
    }
    name
}

fn reference_value(cache: &LookupCache, spec: &PrerequisiteSpec, stored: Option<&Value>) -> Value {
    match stored {
        Some(Value::String(id)) => display_name(cache, spec, id)
            .map(Value::String)
            .unwrap_or(Value::Null),
        Some(Value::Array(ids)) => {
            let names: Vec<String> = ids
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(|id| display_name(cache, spec, id))
                .collect();
            if names.is_empty() {
                Value::Null
            } else {
                Value::String(names.join(", "))
            }
        }
        _ => Value::Null,
    }
}

fn folded_value(schema: &SheetSchema, column: &ColumnSpec, field: &str, record: &Entity) -> Value {
    let object = match record.get(field) {
        Some(Value::Object(map)) => map,
        _ => return Value::Null,
    };
    let found = match &schema.shape {
        EntityShape::NestedSettings { .. } => column
            .split_section()
            .and_then(|(section, key)| object.get(section)?.get(key)),
        EntityShape::Embedded { members, .. } => members
            .iter()
            .find(|(header, _)| *header == column.header)
            .and_then(|(_, member)| object.get(*member)),
        EntityShape::Flat => None,
    };
    found.cloned().unwrap_or(Value::Null)
}

/// 存储记录 → 按表头索引的值
pub fn shape_record(schema: &SheetSchema, record: &Entity, cache: &LookupCache) -> Entity {
    let mut shaped = Entity::new();
    for column in &schema.columns {
        let value = if let Some(spec) = &column.prerequisite {
            reference_value(cache, spec, record.get(spec.injected_id_field))
        } else if let Some(field) = schema.folded_into(column) {
            folded_value(schema, column, field, record)
        } else {
            record.get(column.stored_name()).cloned().unwrap_or(Value::Null)
        };
        shaped.insert(column.header.to_string(), value);
    }
    shaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::sheets::{property, settings};
    use serde_json::json;

    fn entity(value: Value) -> Entity {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_renamed_fields_use_headers() {
        let schema = property::party_cohorts();
        let record = entity(json!({"id": "x", "name": "Students"}));
        let shaped = shape_record(&schema, &record, &LookupCache::default());
        assert_eq!(shaped["name"], json!("Students"));
        assert!(!shaped.contains_key("id"));
    }

    #[test]
    fn test_nested_settings_unfold() {
        let schema = settings::global_settings();
        let record = entity(json!({
            "settings": {"communications": {"contactUsLink": "https://example.com"}}
        }));
        let shaped = shape_record(&schema, &record, &LookupCache::default());
        assert_eq!(shaped["communications\ncontactUsLink"], json!("https://example.com"));
        assert_eq!(shaped["communications\nfooterNotice"], Value::Null);
    }

    #[test]
    fn test_unknown_reference_id_exports_empty() {
        let schema = property::property_close_schedule();
        let record = entity(json!({"propertyId": "gone", "month": 1, "year": 2030}));
        let shaped = shape_record(&schema, &record, &LookupCache::default());
        assert_eq!(shaped["propertyName"], Value::Null);
        assert_eq!(shaped["month"], json!(1));
    }
}
