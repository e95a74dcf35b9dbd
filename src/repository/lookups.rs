// ==========================================
// 数据泵 - 批次级查找表
// ==========================================
// 职责: 每批次预加载一次的只读查找数据
// - LookupCache: 名称 → id（大小写不敏感，可带作用域）
// - PropertyTimezones: 物业 id → 时区
// 红线: 行处理期间只读内存，不再访问存储
// ==========================================

use crate::domain::calendar::parse_timezone;
use crate::domain::entity::{text_of, Entity};
use crate::repository::error::RepositoryResult;
use crate::repository::storage::{LookupEntry, Storage};
use crate::schema::constants::{tables, PROPERTY_TIMEZONE_FIELD};
use crate::schema::{SheetSchema, TimezoneSource};
use chrono_tz::Tz;
use std::collections::HashMap;
use tracing::warn;

/// 查找键：(目标表, 查找字段, 作用域字段)
pub type LookupKey = (&'static str, &'static str, Option<&'static str>);

/// 单张查找表的索引
#[derive(Debug, Default, Clone)]
struct LookupIndex {
    /// 归一化名称 → (id, 作用域)
    by_key: HashMap<String, Vec<(String, Option<String>)>>,
    /// id → 原始名称
    by_id: HashMap<String, String>,
}

impl LookupIndex {
    fn from_entries(entries: Vec<LookupEntry>) -> Self {
        let mut index = LookupIndex::default();
        for entry in entries {
            index
                .by_key
                .entry(normalize_key(&entry.key))
                .or_default()
                .push((entry.id.clone(), entry.scope.clone()));
            index.by_id.insert(entry.id, entry.key);
        }
        index
    }
}

/// 名称归一化：去首尾空白、小写
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

// ==========================================
// LookupCache
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct LookupCache {
    indexes: HashMap<LookupKey, LookupIndex>,
}

impl LookupCache {
    /// 为 schema 的全部名称引用预加载查找表
    pub async fn preload(storage: &dyn Storage, schema: &SheetSchema) -> RepositoryResult<Self> {
        let mut cache = LookupCache::default();
        for spec in schema.prerequisites() {
            let key: LookupKey = (
                spec.target_table,
                spec.target_lookup_field,
                spec.scope.map(|s| s.target_scope_field),
            );
            cache.load(storage, key).await?;
        }
        Ok(cache)
    }

    /// 加载一张查找表（已加载则跳过）
    pub async fn load(&mut self, storage: &dyn Storage, key: LookupKey) -> RepositoryResult<()> {
        if self.indexes.contains_key(&key) {
            return Ok(());
        }
        let (table, field, scope) = key;
        let entries = storage.load_lookup(table, field, scope).await?;
        self.indexes.insert(key, LookupIndex::from_entries(entries));
        Ok(())
    }

    /// 按名称查找 id
    ///
    /// # 参数
    /// - scope: 作用域值；表带作用域时必须匹配
    pub fn find_id(&self, key: &LookupKey, name: &str, scope: Option<&str>) -> Option<&str> {
        let candidates = self.indexes.get(key)?.by_key.get(&normalize_key(name))?;
        candidates
            .iter()
            .find(|(_, entry_scope)| match (key.2, scope) {
                (None, _) => true,
                (Some(_), Some(expected)) => entry_scope.as_deref() == Some(expected),
                (Some(_), None) => false,
            })
            .map(|(id, _)| id.as_str())
    }

    /// 按 id 反查名称（导出使用）
    pub fn find_name(&self, key: &LookupKey, id: &str) -> Option<&str> {
        self.indexes.get(key)?.by_id.get(id).map(|s| s.as_str())
    }
}

// ==========================================
// PropertyTimezones
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct PropertyTimezones {
    by_id: HashMap<String, Tz>,
}

impl PropertyTimezones {
    pub async fn load(storage: &dyn Storage) -> RepositoryResult<Self> {
        let entries = storage
            .load_lookup(tables::PROPERTY, PROPERTY_TIMEZONE_FIELD, None)
            .await?;
        let mut by_id = HashMap::new();
        for entry in entries {
            match parse_timezone(&entry.key) {
                Some(tz) => {
                    by_id.insert(entry.id, tz);
                }
                None => warn!(property_id = %entry.id, timezone = %entry.key, "物业时区无效，忽略"),
            }
        }
        Ok(Self { by_id })
    }

    /// 仅在 schema 需要时加载
    pub async fn load_for(storage: &dyn Storage, schema: &SheetSchema) -> RepositoryResult<Self> {
        let needs = matches!(schema.timezone, TimezoneSource::ViaProperty(_))
            || schema
                .custom
                .map(|c| c.needs_property_timezones())
                .unwrap_or(false);
        if needs {
            Self::load(storage).await
        } else {
            Ok(Self::default())
        }
    }

    pub fn get(&self, property_id: &str) -> Option<Tz> {
        self.by_id.get(property_id).copied()
    }
}

/// 记录所属时区（记录以 DB 字段为键）
pub fn record_timezone(
    schema: &SheetSchema,
    record: &Entity,
    property_timezones: &PropertyTimezones,
    default: Tz,
) -> Tz {
    match schema.timezone {
        TimezoneSource::Default => None,
        TimezoneSource::OwnField(field) => text_of(record, field).and_then(|v| parse_timezone(&v)),
        TimezoneSource::ViaProperty(field) => {
            text_of(record, field).and_then(|id| property_timezones.get(&id))
        }
    }
    .unwrap_or(default)
}
