// ==========================================
// 数据泵 - Schema 层
// ==========================================
// 职责: 各工作表的静态结构描述与注册表
// 红线: 导入与导出共用，进程内只构建一次
// ==========================================

pub mod constants;
pub mod registry;
pub mod sheets;
pub mod types;

// 重导出核心类型
pub use registry::{
    get_column_headers, get_schema, normalize_sheet_name, registry, SchemaError, SchemaRegistry,
};
pub use types::{
    ColumnFormat, ColumnSpec, CustomCheckKind, EntityShape, FieldRule, PersistMode,
    PrerequisiteScope, PrerequisiteSpec, PropertyScope, RowRule, SemanticType, SheetSchema,
    StoredField, StoredKind, TimezoneSource, ValidationMeta,
};
