// ==========================================
// 物业配置数据泵 - 核心库
// ==========================================
// 职责: 多工作表工作簿 ⇄ 关系库 的 schema 驱动导入导出
// 技术栈: Rust + SQLite
// 流程: 工作表行 → 字段校验 → 引用解析 → 自定义校验 → 落库
//       存储记录 → 整形 → 单元格转换 → 工作表行
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 单元格、实体、结果对象
pub mod domain;

// Schema 层 - 工作表结构与注册表
pub mod schema;

// 数据仓储层 - 存储接口与 SQLite 实现
pub mod repository;

// 导入层
pub mod importer;

// 导出层
pub mod exporter;

// 工作簿读写
pub mod workbook;

// 配置层
pub mod config;

// 运行上下文
pub mod context;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 调度入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use api::{DataPumpApi, DataPumpError, DataPumpResult};
pub use context::PumpContext;
pub use domain::{
    CellValue, DataPump, DataPumpRow, Entity, ExportBatch, FieldError, FieldErrorKind,
    ImportOutcome, InvalidCell, RawSheet, SheetFailure, SheetRow, WorkbookImportReport,
};
pub use exporter::{export_sheet, ExportRequest};
pub use importer::{import_sheet, ImportOptions};
pub use repository::{SqliteStorage, Storage};
pub use schema::{get_column_headers, get_schema, registry, SheetSchema};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "物业配置数据泵";
