// ==========================================
// 数据泵 - 名称引用解析
// ==========================================
// 职责: 把工作表中的名称引用解析为内部 id 并注入实体
// - 独立引用先于带作用域的引用（作用域取自已注入的 id）
// - 多值字段逐个解析，已解析的 id 按顺序保留
// - 未解析的引用作为字段错误返回，不中断其他引用
// 红线: 只读批次级 LookupCache，不访问存储
// ==========================================

use crate::domain::entity::{split_tokens, text_of, Entity};
use crate::domain::outcome::FieldError;
use crate::repository::{LookupCache, LookupKey};
use crate::schema::PrerequisiteSpec;
use serde_json::Value;
use tracing::warn;

/// 未解析引用的消息前缀
pub const ELEMENT_DOESNT_EXIST: &str = "ELEMENT_DOESNT_EXIST";

/// 引用对应的查找键
pub fn lookup_key(spec: &PrerequisiteSpec) -> LookupKey {
    (
        spec.target_table,
        spec.target_lookup_field,
        spec.scope.map(|s| s.target_scope_field),
    )
}

/// 源字段中的名称（多值列已是数组，单值列按原文）
fn source_names(entity: &Entity, spec: &PrerequisiteSpec) -> Vec<String> {
    match entity.get(spec.source_field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => match text_of(entity, spec.source_field) {
            Some(text) if spec.multi_value => split_tokens(&text),
            Some(text) => vec![text],
            None => Vec::new(),
        },
    }
}

fn not_found(spec: &PrerequisiteSpec, names: &[String]) -> FieldError {
    FieldError::prerequisite(
        spec.source_field,
        format!("{}: {}", ELEMENT_DOESNT_EXIST, names.join(", ")),
    )
}

/// 解析实体上的全部名称引用
///
/// # 参数
/// - entity: 已通过字段校验的实体（按表头），解析结果注入其中
/// - specs: 名称引用（独立引用在前）
/// - cache: 批次级查找表
///
/// # 返回
/// - 未解析引用对应的 FieldError（每个引用至多一条）
pub fn resolve_prerequisites(
    entity: &mut Entity,
    specs: &[&PrerequisiteSpec],
    cache: &LookupCache,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for spec in specs {
        let names = source_names(entity, spec);
        if names.is_empty() {
            let empty = if spec.multi_value {
                Value::Array(Vec::new())
            } else {
                Value::Null
            };
            entity.insert(spec.injected_id_field.to_string(), empty);
            continue;
        }

        let scope_value = spec
            .scope
            .and_then(|s| text_of(entity, s.related_id_field));
        let key = lookup_key(spec);

        let mut ids: Vec<String> = Vec::new();
        let mut missing: Vec<String> = Vec::new();
        for name in &names {
            match cache.find_id(&key, name, scope_value.as_deref()) {
                Some(id) if !ids.iter().any(|existing| existing == id) => ids.push(id.to_string()),
                Some(_) => {}
                None => missing.push(name.clone()),
            }
        }

        if !missing.is_empty() {
            if spec.required {
                errors.push(not_found(spec, &missing));
            } else {
                warn!(
                    field = spec.source_field,
                    table = spec.target_table,
                    missing = %missing.join(", "),
                    "可选引用未解析，已忽略"
                );
            }
        }

        let injected = if spec.multi_value {
            Value::Array(ids.into_iter().map(Value::String).collect())
        } else {
            ids.into_iter()
                .next()
                .map(Value::String)
                .unwrap_or(Value::Null)
        };
        entity.insert(spec.injected_id_field.to_string(), injected);
    }

    errors
}
