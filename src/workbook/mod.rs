// ==========================================
// 数据泵 - 工作簿读写
// ==========================================
// 职责: 二进制工作簿 ⇄ RawSheet / DataPump
// 工具: calamine + csv 读取，rust_xlsxwriter 写出
// ==========================================

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{WorkbookError, WorkbookResult};
pub use reader::{read_csv, read_excel, read_workbook};
pub use writer::write_workbook;
