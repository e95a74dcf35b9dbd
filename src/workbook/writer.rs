// ==========================================
// 数据泵 - 工作簿写出
// ==========================================
// 每个 DataPump 一张工作表: 第 0 行表头（加粗），其后为数据行
// 数值写为数值，其余写为文本，空单元格不写
// ==========================================

use crate::domain::cell::{bool_token, CellValue};
use crate::domain::outcome::DataPump;
use crate::workbook::error::WorkbookResult;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

fn write_sheet(worksheet: &mut Worksheet, pump: &DataPump, header_format: &Format) -> WorkbookResult<()> {
    worksheet.set_name(&pump.sheet_name)?;

    for (col, header) in pump.column_headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header.as_str(), header_format)?;
    }

    for (r, row) in pump.data.iter().enumerate() {
        let row_idx = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Number(n) => {
                    worksheet.write_number(row_idx, col, *n)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_string(row_idx, col, bool_token(*b))?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(row_idx, col, s.as_str())?;
                }
            }
        }
    }
    Ok(())
}

/// 写出导出结果为 xlsx
pub fn write_workbook<P: AsRef<Path>>(path: P, pumps: &[DataPump]) -> WorkbookResult<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for pump in pumps {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, pump, &header_format)?;
    }

    workbook.save(path.as_ref())?;
    info!(path = %path.as_ref().display(), sheets = pumps.len(), "工作簿写出完成");
    Ok(())
}
