// ==========================================
// 数据泵 - 工作簿读取
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xls/.ods) 全部工作表 / CSV 单表（表名取文件名）
// 约定: 第一行为表头；表头去空白；完全空白的行跳过
// ==========================================

use crate::domain::calendar::format_sheet_date;
use crate::domain::cell::{CellValue, RawSheet, SheetRow};
use crate::workbook::error::{WorkbookError, WorkbookResult};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

const EXCEL_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Excel 日期序列号 → 日历日（1900 日期系统）
///
/// 超出日历范围的序列号返回 None。
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = Duration::try_days(serial.floor() as i64)?;
    epoch.checked_add_signed(days)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // 无法换算的序列号保留为数值，由 DATE 规则报错
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|date| CellValue::text(format_sheet_date(date)))
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .map(|date| CellValue::text(format_sheet_date(date)))
            .unwrap_or_else(|| CellValue::from(s.as_str())),
        Data::DurationIso(s) => CellValue::from(s.as_str()),
    }
}

/// 按表头组装一行（空表头列忽略）
fn build_row<I>(headers: &[String], cells: I) -> SheetRow
where
    I: IntoIterator<Item = CellValue>,
{
    let mut row = SheetRow::new();
    for (header, value) in headers.iter().zip(cells) {
        if !header.is_empty() {
            row.cells.insert(header.clone(), value);
        }
    }
    row
}

fn check_path(path: &Path) -> WorkbookResult<String> {
    if !path.exists() {
        return Err(WorkbookError::FileNotFound(path.display().to_string()));
    }
    Ok(path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase())
}

// ==========================================
// CSV
// ==========================================

/// 读取 CSV 为单张表
pub fn read_csv(path: &Path) -> WorkbookResult<RawSheet> {
    let ext = check_path(path)?;
    if ext != "csv" {
        return Err(WorkbookError::UnsupportedFormat(ext));
    }

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row = build_row(&headers, record.iter().map(|v| CellValue::from(v.trim())));
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    debug!(sheet = %name, rows = rows.len(), "CSV 读取完成");
    Ok(RawSheet::new(name, headers, rows))
}

// ==========================================
// Excel
// ==========================================

/// 读取 Excel 全部工作表（保持工作簿中的顺序）
pub fn read_excel(path: &Path) -> WorkbookResult<Vec<RawSheet>> {
    let ext = check_path(path)?;
    if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
        return Err(WorkbookError::UnsupportedFormat(ext));
    }

    let mut workbook = open_workbook_auto(path)?;
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let mut range_rows = range.rows();

        let headers: Vec<String> = match range_rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell_value(cell).as_text())
                .collect(),
            None => {
                sheets.push(RawSheet::new(name, Vec::new(), Vec::new()));
                continue;
            }
        };

        let mut rows = Vec::new();
        for data_row in range_rows {
            let row = build_row(&headers, data_row.iter().map(cell_value));
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }
        debug!(sheet = %name, rows = rows.len(), "工作表读取完成");
        sheets.push(RawSheet::new(name, headers, rows));
    }
    Ok(sheets)
}

/// 按扩展名读取工作簿
pub fn read_workbook<P: AsRef<Path>>(path: P) -> WorkbookResult<Vec<RawSheet>> {
    let path = path.as_ref();
    let ext = check_path(path)?;
    let sheets = match ext.as_str() {
        "csv" => vec![read_csv(path)?],
        e if EXCEL_EXTENSIONS.contains(&e) => read_excel(path)?,
        _ => return Err(WorkbookError::UnsupportedFormat(ext)),
    };
    info!(path = %path.display(), sheets = sheets.len(), "工作簿读取完成");
    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_reads_headers_and_skips_blank_rows() {
        let mut file = Builder::new().prefix("Lease Templates").suffix(".csv").tempfile().unwrap();
        writeln!(file, " name ,category").unwrap();
        writeln!(file, "Lease,Leasing").unwrap();
        writeln!(file, ",").unwrap();
        writeln!(file, "Renewal,").unwrap();

        let sheet = read_csv(file.path()).unwrap();
        assert_eq!(sheet.headers, vec!["name", "category"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].text("name"), "Renewal");
        assert_eq!(sheet.rows[1].get("category"), Some(&CellValue::Empty));
        assert!(sheet.name.starts_with("Lease Templates"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_workbook("does-not-exist.xlsx").unwrap_err();
        assert!(matches!(err, WorkbookError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let err = read_workbook(file.path()).unwrap_err();
        assert!(matches!(err, WorkbookError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_excel_serial_date() {
        assert_eq!(excel_serial_to_date(45366.0), NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_out_of_range_serial_is_rejected() {
        assert_eq!(excel_serial_to_date(1e300), None);
        assert_eq!(excel_serial_to_date(-1e300), None);
        assert_eq!(excel_serial_to_date(1e14), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }
}
