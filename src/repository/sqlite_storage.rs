// ==========================================
// 数据泵 - SQLite 存储实现
// ==========================================
// 职责: 实现 Storage（使用 rusqlite）
// - 每个 SheetSchema 一张表，id 主键 + 自然键唯一索引
// - 值按 StoredKind 编码（JSON/列表以文本保存）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::cell::format_number;
use crate::domain::entity::{number_value, Entity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::storage::{LookupEntry, Storage};
use crate::schema::{PropertyScope, SheetSchema, StoredField, StoredKind};
use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument};
use uuid::Uuid;

/// SQL 标识符加引号
fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quoted_list(fields: &[&str]) -> String {
    fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(", ")
}

fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 实体值 → SQL 值
fn encode_value(field: &StoredField, value: Option<&Value>) -> RepositoryResult<SqlValue> {
    let value = match value {
        None | Some(Value::Null) => return Ok(SqlValue::Null),
        Some(v) => v,
    };

    let encoded = match field.kind {
        StoredKind::Real => match value {
            Value::Number(n) => SqlValue::Real(n.as_f64().unwrap_or_default()),
            Value::String(s) => SqlValue::Real(s.trim().parse().map_err(|_| {
                RepositoryError::FieldValueError {
                    field: field.name.to_string(),
                    message: format!("非数值: {}", s),
                }
            })?),
            other => {
                return Err(RepositoryError::FieldValueError {
                    field: field.name.to_string(),
                    message: format!("非数值: {}", other),
                })
            }
        },
        StoredKind::Bool => match value {
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Number(n) => SqlValue::Integer(i64::from(n.as_f64().unwrap_or_default() != 0.0)),
            other => {
                return Err(RepositoryError::FieldValueError {
                    field: field.name.to_string(),
                    message: format!("非布尔值: {}", other),
                })
            }
        },
        StoredKind::Json | StoredKind::IdList => SqlValue::Text(serde_json::to_string(value)?),
        StoredKind::Text | StoredKind::Timestamp | StoredKind::Id => match value {
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Number(n) => SqlValue::Text(n.as_f64().map(format_number).unwrap_or_default()),
            Value::Bool(b) => SqlValue::Text(b.to_string()),
            other => SqlValue::Text(serde_json::to_string(other)?),
        },
    };
    Ok(encoded)
}

/// SQL 值 → 实体值
fn decode_value(field: &StoredField, raw: SqlValue) -> RepositoryResult<Value> {
    let decoded = match (field.kind, raw) {
        (_, SqlValue::Null) => Value::Null,
        (StoredKind::Real, SqlValue::Real(f)) => number_value(f),
        (StoredKind::Real, SqlValue::Integer(i)) => Value::from(i),
        (StoredKind::Bool, SqlValue::Integer(i)) => Value::Bool(i != 0),
        (StoredKind::Json | StoredKind::IdList, SqlValue::Text(s)) => serde_json::from_str(&s)?,
        (_, SqlValue::Text(s)) => Value::String(s),
        (_, SqlValue::Integer(i)) => Value::from(i),
        (_, SqlValue::Real(f)) => number_value(f),
        (_, SqlValue::Blob(_)) => {
            return Err(RepositoryError::FieldValueError {
                field: field.name.to_string(),
                message: "不支持的二进制值".to_string(),
            })
        }
    };
    Ok(decoded)
}

// ==========================================
// SqliteStorage
// ==========================================
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// 创建新的存储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（连接由调用方持有与配置）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 为全部 schema 建表
    pub async fn ensure_tables<'a, I>(&self, schemas: I) -> RepositoryResult<()>
    where
        I: IntoIterator<Item = &'a SheetSchema> + Send,
        I::IntoIter: Send,
    {
        for schema in schemas {
            self.ensure_table(schema).await?;
        }
        Ok(())
    }

    /// 构造 INSERT 语句（可选带 upsert 子句）
    fn insert_sql(schema: &SheetSchema, fields: &[StoredField], upsert: bool) -> String {
        let mut columns = vec!["id"];
        columns.extend(fields.iter().map(|f| f.name));
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(schema.table),
            quoted_list(&columns),
            placeholders(1, columns.len())
        );
        if upsert {
            let updates: Vec<String> = fields
                .iter()
                .map(|f| format!("{col} = excluded.{col}", col = quote(f.name)))
                .chain(std::iter::once("\"updated_at\" = datetime('now')".to_string()))
                .collect();
            sql.push_str(&format!(
                " ON CONFLICT ({}) DO UPDATE SET {} RETURNING \"id\"",
                quoted_list(schema.natural_key()),
                updates.join(", ")
            ));
        }
        sql
    }

    fn record_params(
        id: &str,
        fields: &[StoredField],
        record: &Entity,
    ) -> RepositoryResult<Vec<SqlValue>> {
        let mut values = vec![SqlValue::Text(id.to_string())];
        for field in fields {
            values.push(encode_value(field, record.get(field.name))?);
        }
        Ok(values)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn ensure_table(&self, schema: &SheetSchema) -> RepositoryResult<()> {
        let conn = self.lock()?;
        // 文本自然键与名称查找一致，大小写不敏感
        let columns: Vec<String> = schema
            .stored_fields()
            .iter()
            .map(|f| {
                let collate = if f.kind == StoredKind::Text && schema.natural_key().contains(&f.name) {
                    " COLLATE NOCASE"
                } else {
                    ""
                };
                format!("{} {}{}", quote(f.name), f.kind.sql_type(), collate)
            })
            .collect();

        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                "id" TEXT PRIMARY KEY,
                {columns},
                "updated_at" TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
            table = quote(schema.table),
            columns = columns.join(",\n                "),
        ))?;

        if !schema.natural_key().is_empty() {
            conn.execute_batch(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({});",
                quote(&format!("ux_{}_natural_key", schema.table)),
                quote(schema.table),
                quoted_list(schema.natural_key()),
            ))?;
        }

        debug!(table = schema.table, "表结构已就绪");
        Ok(())
    }

    async fn load_lookup(
        &self,
        table: &str,
        key_field: &str,
        scope_field: Option<&str>,
    ) -> RepositoryResult<Vec<LookupEntry>> {
        let conn = self.lock()?;
        let scope_expr = scope_field
            .map(|f| format!("CAST({} AS TEXT)", quote(f)))
            .unwrap_or_else(|| "NULL".to_string());
        let sql = format!(
            "SELECT \"id\", CAST({key} AS TEXT), {scope} FROM {table} WHERE {key} IS NOT NULL ORDER BY rowid",
            key = quote(key_field),
            scope = scope_expr,
            table = quote(table),
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(LookupEntry {
                id: row.get(0)?,
                key: row.get(1)?,
                scope: row.get(2)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    #[instrument(skip(self, schema, record), fields(table = schema.table))]
    async fn upsert(&self, schema: &SheetSchema, record: &Entity) -> RepositoryResult<String> {
        for key in schema.natural_key() {
            if record.get(*key).map(|v| v.is_null()).unwrap_or(true) {
                return Err(RepositoryError::FieldValueError {
                    field: key.to_string(),
                    message: "自然键为空".to_string(),
                });
            }
        }

        let fields = schema.stored_fields();
        let id = Uuid::new_v4().to_string();
        let values = Self::record_params(&id, &fields, record)?;
        let upsert = !schema.natural_key().is_empty();
        let sql = Self::insert_sql(schema, &fields, upsert);

        let conn = self.lock()?;
        if upsert {
            let stored_id: String =
                conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
            Ok(stored_id)
        } else {
            conn.execute(&sql, params_from_iter(values.iter()))?;
            Ok(id)
        }
    }

    #[instrument(skip(self, schema, records), fields(table = schema.table, count = records.len()))]
    async fn replace_all(&self, schema: &SheetSchema, records: &[Entity]) -> RepositoryResult<usize> {
        let fields = schema.stored_fields();
        let sql = Self::insert_sql(schema, &fields, false);

        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(&format!("DELETE FROM {}", quote(schema.table)), [])?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for record in records {
                let id = Uuid::new_v4().to_string();
                let values = Self::record_params(&id, &fields, record)?;
                stmt.execute(params_from_iter(values.iter()))?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(records.len())
    }

    async fn query(
        &self,
        schema: &SheetSchema,
        property_ids: Option<&[String]>,
    ) -> RepositoryResult<Vec<Entity>> {
        let fields = schema.stored_fields();
        let mut columns = vec!["id"];
        columns.extend(fields.iter().map(|f| f.name));

        let mut sql = format!(
            "SELECT {} FROM {}",
            quoted_list(&columns),
            quote(schema.table)
        );

        let mut params: Vec<SqlValue> = Vec::new();
        let ids = property_ids.filter(|ids| !ids.is_empty());
        if let (Some(ids), Some(scope)) = (ids, schema.property_scope) {
            let marks = placeholders(1, ids.len());
            let condition = match scope {
                PropertyScope::SelfId => format!("\"id\" IN ({})", marks),
                PropertyScope::Id(field) => format!("{} IN ({})", quote(field), marks),
                PropertyScope::IdList(field) => format!(
                    "EXISTS (SELECT 1 FROM json_each({}.{}) WHERE json_each.value IN ({}))",
                    quote(schema.table),
                    quote(field),
                    marks
                ),
            };
            sql.push_str(&format!(" WHERE {}", condition));
            params.extend(ids.iter().map(|id| SqlValue::Text(id.clone())));
        }

        let mut order: Vec<String> = schema.order_fields().iter().map(|f| quote(f)).collect();
        order.push("rowid".to_string());
        sql.push_str(&format!(" ORDER BY {}", order.join(", ")));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Entity::new();
            let id: String = row.get(0)?;
            record.insert("id".to_string(), Value::String(id));
            for (idx, field) in fields.iter().enumerate() {
                let raw: SqlValue = row.get(idx + 1)?;
                record.insert(field.name.to_string(), decode_value(field, raw)?);
            }
            records.push(record);
        }

        debug!(table = schema.table, count = records.len(), "查询完成");
        Ok(records)
    }
}
