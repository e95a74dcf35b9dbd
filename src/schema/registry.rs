// ==========================================
// 数据泵 - Schema 注册表
// ==========================================
// 职责: 进程内唯一的只读 schema 集合
// - 工作表名称查找（忽略大小写与空白）
// - 依据名称引用构建依赖图，计算导入顺序/分层
// 红线: 构建后不再修改；查找无 I/O
// ==========================================

use crate::schema::sheets;
use crate::schema::types::SheetSchema;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use thiserror::Error;

/// Schema 配置错误（程序错误，不在本地捕获）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("工作表依赖存在环: {0}")]
    DependencyCycle(String),

    #[error("引用目标表未注册 (sheet={sheet}, table={table})")]
    UnknownTargetTable { sheet: String, table: String },

    #[error("自然键字段不是存储字段 (sheet={sheet}, field={field})")]
    InvalidNaturalKey { sheet: String, field: String },

    #[error("作用域字段未被独立引用注入 (sheet={sheet}, field={field})")]
    UnboundScope { sheet: String, field: String },

    #[error("表头重复 (sheet={sheet}, header={header})")]
    DuplicateHeader { sheet: String, header: String },

    #[error("工作表名称重复: {0}")]
    DuplicateSheet(String),
}

/// 工作表名称归一化：小写并去除所有空白
pub fn normalize_sheet_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

// ==========================================
// SchemaRegistry
// ==========================================
pub struct SchemaRegistry {
    sheets: Vec<SheetSchema>,
    by_name: HashMap<String, usize>,
    by_table: HashMap<&'static str, usize>,
}

impl SchemaRegistry {
    pub fn new(sheets: Vec<SheetSchema>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_table = HashMap::new();
        for (idx, schema) in sheets.iter().enumerate() {
            by_name
                .entry(normalize_sheet_name(schema.sheet_name))
                .or_insert(idx);
            by_table.entry(schema.table).or_insert(idx);
        }
        Self {
            sheets,
            by_name,
            by_table,
        }
    }

    pub fn all(&self) -> &[SheetSchema] {
        &self.sheets
    }

    /// 按工作表名称查找（忽略大小写与空白）
    pub fn get_schema(&self, sheet_name: &str) -> Option<&SheetSchema> {
        self.by_name
            .get(&normalize_sheet_name(sheet_name))
            .map(|idx| &self.sheets[*idx])
    }

    pub fn by_table(&self, table: &str) -> Option<&SheetSchema> {
        self.by_table.get(table).map(|idx| &self.sheets[*idx])
    }

    /// 校验注册表的结构一致性
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen_names = HashSet::new();
        for schema in &self.sheets {
            let sheet = schema.sheet_name.to_string();
            if !seen_names.insert(normalize_sheet_name(schema.sheet_name)) {
                return Err(SchemaError::DuplicateSheet(sheet));
            }

            let mut headers = HashSet::new();
            for column in &schema.columns {
                if !headers.insert(column.header) {
                    return Err(SchemaError::DuplicateHeader {
                        sheet,
                        header: column.header.to_string(),
                    });
                }
            }

            for table in schema.dependency_tables() {
                if !self.by_table.contains_key(table) {
                    return Err(SchemaError::UnknownTargetTable {
                        sheet,
                        table: table.to_string(),
                    });
                }
            }

            let stored: HashSet<&str> = schema.stored_fields().iter().map(|f| f.name).collect();
            for field in schema.natural_key() {
                if !stored.contains(field) {
                    return Err(SchemaError::InvalidNaturalKey {
                        sheet,
                        field: field.to_string(),
                    });
                }
            }

            let standalone: HashSet<&str> = schema
                .prerequisites()
                .iter()
                .filter(|p| p.scope.is_none())
                .map(|p| p.injected_id_field)
                .collect();
            for spec in schema.prerequisites() {
                if let Some(scope) = spec.scope {
                    if !standalone.contains(scope.related_id_field) {
                        return Err(SchemaError::UnboundScope {
                            sheet,
                            field: scope.related_id_field.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// 依赖分层：每层中的工作表只依赖更早层的表
    ///
    /// 同层内保持注册顺序。
    pub fn dependency_layers(&self) -> Result<Vec<Vec<&SheetSchema>>, SchemaError> {
        let mut placed: HashSet<&'static str> = HashSet::new();
        let mut remaining: Vec<&SheetSchema> = self.sheets.iter().collect();
        let mut layers = Vec::new();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<&SheetSchema>, Vec<&SheetSchema>) =
                remaining.into_iter().partition(|schema| {
                    schema
                        .dependency_tables()
                        .iter()
                        .all(|table| placed.contains(table) || !self.by_table.contains_key(table))
                });

            if ready.is_empty() {
                let names: Vec<&str> = blocked.iter().map(|s| s.sheet_name).collect();
                return Err(SchemaError::DependencyCycle(names.join(", ")));
            }

            for schema in &ready {
                placed.insert(schema.table);
            }
            layers.push(ready);
            remaining = blocked;
        }

        Ok(layers)
    }

    /// 拓扑排序后的导入顺序
    pub fn import_order(&self) -> Result<Vec<&SheetSchema>, SchemaError> {
        Ok(self.dependency_layers()?.into_iter().flatten().collect())
    }
}

static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();

/// 进程级注册表（首次访问时构建）
pub fn registry() -> &'static SchemaRegistry {
    REGISTRY.get_or_init(|| SchemaRegistry::new(sheets::all_sheets()))
}

/// 按工作表名称获取 schema
pub fn get_schema(sheet_name: &str) -> Option<&'static SheetSchema> {
    registry().get_schema(sheet_name)
}

/// schema 的表头（自然顺序）
pub fn get_column_headers(schema: &SheetSchema) -> Vec<String> {
    schema.columns.iter().map(|c| c.header.to_string()).collect()
}
