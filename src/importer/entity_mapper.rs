// ==========================================
// 数据泵 - 实体映射
// ==========================================
// 职责:
// - 单元格 → 类型化实体（按表头，供引用解析与自定义校验）
// - 类型化实体 → 落库记录（DB 字段名、嵌套折叠、日期转 UTC）
// 红线: 不做校验；调用方保证该行已通过字段校验
// ==========================================

use crate::domain::calendar::{local_midnight_utc, parse_sheet_date};
use crate::domain::cell::{CellValue, SheetRow};
use crate::domain::entity::{number_value, split_tokens, text_of, Entity};
use crate::repository::{record_timezone, PropertyTimezones};
use crate::schema::{ColumnSpec, EntityShape, SemanticType, SheetSchema};
use chrono_tz::Tz;
use serde_json::{Map, Value};

/// 单元格 → 布尔（空值为 None）
pub fn cell_to_bool(value: &CellValue) -> Option<bool> {
    match value {
        CellValue::Bool(b) => Some(*b),
        CellValue::Number(n) => Some(*n != 0.0),
        other => match other.as_text().to_lowercase().as_str() {
            "true" | "1" | "x" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
    }
}

fn typed_value(column: &ColumnSpec, cell: &CellValue) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    match column.semantic_type {
        SemanticType::String => Value::String(cell.as_text()),
        SemanticType::Number => match cell {
            CellValue::Number(n) => number_value(*n),
            other => other
                .as_text()
                .parse::<f64>()
                .map(number_value)
                .unwrap_or(Value::Null),
        },
        SemanticType::Boolean => cell_to_bool(cell).map(Value::Bool).unwrap_or(Value::Null),
        SemanticType::Array => Value::Array(
            split_tokens(&cell.as_text())
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
    }
}

/// 数据行 → 类型化实体（按表头）
pub fn row_to_entity(schema: &SheetSchema, row: &SheetRow) -> Entity {
    let mut entity = Entity::new();
    for column in &schema.columns {
        let value = row
            .get(column.header)
            .map(|cell| typed_value(column, cell))
            .unwrap_or(Value::Null);
        entity.insert(column.header.to_string(), value);
    }
    entity
}

fn nested_object<'a>(record: &'a mut Entity, field: &str) -> Option<&'a mut Map<String, Value>> {
    let slot = record
        .entry(field.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
}

/// 把值放到折叠对象中的位置
fn fold_value(schema: &SheetSchema, column: &ColumnSpec, field: &str, record: &mut Entity, value: Value) {
    match &schema.shape {
        EntityShape::NestedSettings { .. } => {
            if let Some((section, key)) = column.split_section() {
                if let Some(section_map) = nested_object(record, field) {
                    let slot = section_map
                        .entry(section.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(map) = slot {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
        EntityShape::Embedded { members, .. } => {
            if let Some((_, member)) = members.iter().find(|(h, _)| *h == column.header) {
                if let Some(map) = nested_object(record, field) {
                    map.insert(member.to_string(), value);
                }
            }
        }
        EntityShape::Flat => {
            record.insert(column.stored_name().to_string(), value);
        }
    }
}

/// 类型化实体 → 落库记录
///
/// # 参数
/// - entity: 已注入引用 id 的实体（按表头）
/// - property_timezones: 批次级物业时区
/// - default_timezone: 无自身时区时使用
pub fn entity_to_record(
    schema: &SheetSchema,
    entity: &Entity,
    property_timezones: &PropertyTimezones,
    default_timezone: Tz,
) -> Entity {
    let mut record = Entity::new();
    let mut dates: Vec<&ColumnSpec> = Vec::new();

    for column in &schema.columns {
        if let Some(spec) = &column.prerequisite {
            let id = entity
                .get(spec.injected_id_field)
                .cloned()
                .unwrap_or(Value::Null);
            record.insert(spec.injected_id_field.to_string(), id);
            continue;
        }
        if column.is_date() {
            dates.push(column);
            continue;
        }
        let value = entity.get(column.header).cloned().unwrap_or(Value::Null);
        match schema.folded_into(column) {
            Some(field) => fold_value(schema, column, field, &mut record, value),
            None => {
                record.insert(column.stored_name().to_string(), value);
            }
        }
    }

    // 日期依赖记录时区（时区字段或物业 id 已在上面写入）
    let tz = record_timezone(schema, &record, property_timezones, default_timezone);
    for column in dates {
        let value = text_of(entity, column.header)
            .and_then(|text| parse_sheet_date(&text))
            .map(|date| Value::String(local_midnight_utc(date, tz).to_rfc3339()))
            .unwrap_or(Value::Null);
        match schema.folded_into(column) {
            Some(field) => fold_value(schema, column, field, &mut record, value),
            None => {
                record.insert(column.stored_name().to_string(), value);
            }
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::parse_timezone;
    use crate::schema::sheets::{property, settings};
    use serde_json::json;

    #[test]
    fn test_row_to_entity_types_cells() {
        let schema = property::properties();
        let row = SheetRow::from_pairs(vec![
            ("name", CellValue::from("Parkmerced")),
            ("inactiveFlag", CellValue::from("x")),
            ("daughterProperties", CellValue::from("A, B")),
        ]);
        let entity = row_to_entity(&schema, &row);
        assert_eq!(entity["name"], json!("Parkmerced"));
        assert_eq!(entity["inactiveFlag"], json!(true));
        assert_eq!(entity["daughterProperties"], json!(["A", "B"]));
        assert_eq!(entity["owner"], Value::Null);
    }

    #[test]
    fn test_cell_to_bool() {
        assert_eq!(cell_to_bool(&CellValue::from("TRUE")), Some(true));
        assert_eq!(cell_to_bool(&CellValue::from("0")), Some(false));
        assert_eq!(cell_to_bool(&CellValue::Number(1.0)), Some(true));
        assert_eq!(cell_to_bool(&CellValue::Empty), None);
    }

    #[test]
    fn test_record_renames_and_converts_dates_in_own_timezone() {
        let schema = property::properties();
        let row = SheetRow::from_pairs(vec![
            ("name", "Parkmerced"),
            ("timeZone", "America/Los_Angeles"),
            ("startDate", "3/15/2024"),
            ("inactiveFlag", "false"),
        ]);
        let entity = row_to_entity(&schema, &row);
        let utc = parse_timezone("UTC").unwrap();
        let record = entity_to_record(&schema, &entity, &PropertyTimezones::default(), utc);
        assert_eq!(record["timezone"], json!("America/Los_Angeles"));
        assert_eq!(record["startDate"], json!("2024-03-15T07:00:00+00:00"));
        assert_eq!(record["inactive"], json!(false));
        assert!(!record.contains_key("timeZone"));
        assert!(!record.contains_key("inactiveFlag"));
    }

    #[test]
    fn test_nested_settings_fold() {
        let schema = settings::global_settings();
        let headers = schema.headers();
        let row = SheetRow::from_pairs(vec![(headers[0], "https://example.com/contact")]);
        let entity = row_to_entity(&schema, &row);
        let utc = parse_timezone("UTC").unwrap();
        let record = entity_to_record(&schema, &entity, &PropertyTimezones::default(), utc);
        assert_eq!(record.len(), 1);
        let (section, key) = headers[0].split_once('\n').unwrap();
        assert_eq!(record["settings"][section][key], json!("https://example.com/contact"));
    }

    #[test]
    fn test_embedded_contact_info_fold() {
        let schema = property::business_entities();
        let row = SheetRow::from_pairs(vec![
            ("name", "Acme"),
            ("contactName", "Jo Doe"),
            ("contactEmail", "jo@acme.com"),
        ]);
        let entity = row_to_entity(&schema, &row);
        let utc = parse_timezone("UTC").unwrap();
        let record = entity_to_record(&schema, &entity, &PropertyTimezones::default(), utc);
        assert_eq!(record["contactInfo"]["name"], json!("Jo Doe"));
        assert_eq!(record["contactInfo"]["email"], json!("jo@acme.com"));
        assert_eq!(record["contactInfo"]["phone"], Value::Null);
        assert!(!record.contains_key("contactEmail"));
    }
}
