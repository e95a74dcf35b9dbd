// ==========================================
// 数据泵 - 导入层
// ==========================================
// 职责: 工作表行 → 校验 → 引用解析 → 自定义校验 → 落库
// 流程编排见 sheet_importer；各阶段为独立模块
// ==========================================

// 模块声明
pub mod custom;
pub mod custom_validator;
pub mod entity_mapper;
pub mod error;
pub mod field_validator;
pub mod prerequisite_resolver;
pub mod sheet_importer;

// 重导出核心类型
pub use custom_validator::{build_custom_check, BatchLookups, CustomCheck};
pub use error::{ImportError, ImportResult};
pub use field_validator::{validate_field, validate_row};
pub use prerequisite_resolver::resolve_prerequisites;
pub use sheet_importer::{import_sheet, missing_headers, ImportOptions};
