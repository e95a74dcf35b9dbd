// ==========================================
// 数据泵 - 导出层
// ==========================================
// 职责: 存储记录 → 按调用方表头顺序的工作表行
// ==========================================

pub mod cell_coercion;
pub mod entity_shaper;
pub mod error;
pub mod sheet_exporter;

pub use error::{ExportError, ExportResult};
pub use sheet_exporter::{export_sheet, ExportRequest};
