// ==========================================
// 数据泵 - 工作表调度 API
// ==========================================
// 职责: 工作表名称 → schema，按依赖分层调度导入/导出
// - 未注册的工作表静默跳过
// - 单表失败记录为 SheetFailure，不影响其他表
// - 同层工作表有限并发（sheet_concurrency）
// 红线: 只有致命配置错误（注册表不一致、依赖环）以 Err 返回
// ==========================================

use crate::api::error::{DataPumpError, DataPumpResult};
use crate::config::{ConfigManager, DataPumpConfigReader};
use crate::context::PumpContext;
use crate::db::{init_base_schema, open_sqlite_connection};
use crate::domain::cell::RawSheet;
use crate::domain::outcome::{
    DataPump, ExportBatch, ImportOutcome, InvalidCell, SheetFailure, WorkbookImportReport,
};
use crate::exporter::{export_sheet, ExportRequest};
use crate::importer::{import_sheet, ImportError, ImportOptions};
use crate::repository::{RepositoryError, SqliteStorage};
use crate::schema::constants::PAIRED_SHEETS;
use crate::schema::{get_schema, registry, SheetSchema};
use crate::workbook::{read_workbook, write_workbook};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, instrument, warn};

/// 缺失表头的单元格注释
pub const MISSING_COLUMN: &str = "MISSING_COLUMN";

/// 行级错误 → 可定位的单元格
fn invalid_cells(raw: &RawSheet, outcome: &ImportOutcome) -> Vec<InvalidCell> {
    outcome
        .invalid_fields
        .iter()
        .map(|field| InvalidCell {
            sheet_name: raw.name.clone(),
            row: field.row_index,
            column: raw.column_index(&field.field_name),
            field_name: field.field_name.clone(),
            comment: field.message.clone(),
        })
        .collect()
}

fn missing_column_cells(raw: &RawSheet, missing: &[String]) -> Vec<InvalidCell> {
    missing
        .iter()
        .map(|header| InvalidCell {
            sheet_name: raw.name.clone(),
            row: 0,
            column: None,
            field_name: header.clone(),
            comment: MISSING_COLUMN.to_string(),
        })
        .collect()
}

// ==========================================
// DataPumpApi
// ==========================================
pub struct DataPumpApi {
    ctx: PumpContext,
}

impl DataPumpApi {
    pub fn new(ctx: PumpContext) -> Self {
        Self { ctx }
    }

    /// 打开数据库并完成初始化
    ///
    /// 流程: 打开连接 → 基础表 → 读取配置 → 按注册表建表
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub async fn open(db_path: &str) -> DataPumpResult<Self> {
        info!(db_path = %db_path, "打开数据库");
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_base_schema(&conn).map_err(RepositoryError::from)?;
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| DataPumpError::Configuration(e.to_string()))?
            .load_data_pump_config()
            .await
            .map_err(|e| DataPumpError::Configuration(e.to_string()))?;

        let storage = SqliteStorage::from_connection(conn);
        storage.ensure_tables(registry().all()).await?;

        let ctx = PumpContext::new(Arc::new(storage), config)?;
        Ok(Self::new(ctx))
    }

    pub fn context(&self) -> &PumpContext {
        &self.ctx
    }

    fn sheet_concurrency(&self) -> usize {
        self.ctx.config.sheet_concurrency.max(1)
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入单张表（按表名匹配 schema）
    ///
    /// # 返回
    /// - Err(UnknownSheet): 表名未注册
    /// - Err(Import): 整表失败
    pub async fn import_sheet_by_name(&self, raw: &RawSheet) -> DataPumpResult<ImportOutcome> {
        let schema =
            get_schema(&raw.name).ok_or_else(|| DataPumpError::UnknownSheet(raw.name.clone()))?;
        let options = ImportOptions::from_config(&self.ctx.config);
        Ok(import_sheet(&self.ctx, schema, &raw.headers, &raw.rows, options).await?)
    }

    /// 导入整个工作簿
    ///
    /// 按依赖分层依次导入；同层工作表并发执行。
    ///
    /// # 返回
    /// - Ok(report): 单元格错误、各表落库数、表头顺序、表级失败
    /// - Err(Configuration): 注册表不一致或存在依赖环
    #[instrument(skip(self, sheets), fields(sheets = sheets.len()))]
    pub async fn import_workbook(&self, sheets: &[RawSheet]) -> DataPumpResult<WorkbookImportReport> {
        let registry = registry();
        registry
            .validate()
            .map_err(|e| DataPumpError::Configuration(e.to_string()))?;
        let layers = registry
            .dependency_layers()
            .map_err(|e| DataPumpError::Configuration(e.to_string()))?;

        let mut report = WorkbookImportReport::default();

        // === 工作表 → schema ===
        let mut present: HashMap<&'static str, &RawSheet> = HashMap::new();
        for raw in sheets {
            match get_schema(&raw.name) {
                Some(schema) => {
                    if present.contains_key(schema.sheet_name) {
                        warn!(sheet = %raw.name, "工作表重复，忽略后出现的一张");
                    } else {
                        present.insert(schema.sheet_name, raw);
                    }
                }
                None => debug!(sheet = %raw.name, "工作表未注册，跳过"),
            }
        }

        // === 成对导入检查 ===
        let (first, second) = PAIRED_SHEETS;
        for (sheet, partner) in [(first, second), (second, first)] {
            if present.contains_key(sheet) && !present.contains_key(partner) {
                if let Some(raw) = present.remove(sheet) {
                    let err = ImportError::UnpairedSheet {
                        sheet: sheet.to_string(),
                        missing: partner.to_string(),
                    };
                    warn!(sheet = %raw.name, error = %err, "工作表未成对提供");
                    report.errors.push(SheetFailure {
                        sheet_name: raw.name.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        // === 分层导入 ===
        let ctx = &self.ctx;
        for layer in layers {
            let jobs: Vec<(&SheetSchema, &RawSheet)> = layer
                .into_iter()
                .filter_map(|schema| present.get(schema.sheet_name).map(|raw| (schema, *raw)))
                .collect();
            if jobs.is_empty() {
                continue;
            }

            let results: Vec<_> = stream::iter(jobs)
                .map(|(schema, raw)| async move {
                    let options = ImportOptions::from_config(&ctx.config);
                    let result = import_sheet(ctx, schema, &raw.headers, &raw.rows, options).await;
                    (schema, raw, result)
                })
                .buffered(self.sheet_concurrency())
                .collect()
                .await;

            for (schema, raw, result) in results {
                match result {
                    Ok(outcome) => {
                        report.invalid_cells.extend(invalid_cells(raw, &outcome));
                        report
                            .entity_counts
                            .insert(schema.sheet_name.to_string(), outcome.persisted_rows);
                        report
                            .column_headers
                            .insert(schema.sheet_name.to_string(), raw.headers.clone());
                    }
                    Err(e) => {
                        error!(sheet = %raw.name, error = %e, "工作表导入失败");
                        report
                            .invalid_cells
                            .extend(missing_column_cells(raw, e.missing_columns()));
                        report.errors.push(SheetFailure {
                            sheet_name: raw.name.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            imported = report.entity_counts.len(),
            invalid_cells = report.invalid_cells.len(),
            failed = report.errors.len(),
            "工作簿导入完成"
        );
        Ok(report)
    }

    /// 读取工作簿文件并导入
    pub async fn import_file<P: AsRef<Path>>(&self, path: P) -> DataPumpResult<WorkbookImportReport> {
        let sheets = read_workbook(path)?;
        self.import_workbook(&sheets).await
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出选中的工作表（输出保持选中顺序）
    ///
    /// # 参数
    /// - selected: 工作表名称（未注册的跳过）
    /// - property_ids: 物业范围；None 表示全部
    /// - column_headers: 导入时记录的表头顺序（按规范表名）
    #[instrument(skip(self, selected, property_ids, column_headers), fields(selected = selected.len()))]
    pub async fn export_selected(
        &self,
        selected: &[String],
        property_ids: Option<&[String]>,
        column_headers: Option<&BTreeMap<String, Vec<String>>>,
    ) -> ExportBatch {
        let schemas: Vec<&'static SheetSchema> = selected
            .iter()
            .filter_map(|name| {
                let schema = get_schema(name);
                if schema.is_none() {
                    debug!(sheet = %name, "工作表未注册，跳过");
                }
                schema
            })
            .collect();

        let ctx = &self.ctx;
        let results: Vec<_> = stream::iter(schemas)
            .map(|schema| {
                let request = ExportRequest {
                    property_ids_to_export: property_ids.map(|ids| ids.to_vec()),
                    column_headers: column_headers
                        .and_then(|headers| headers.get(schema.sheet_name))
                        .cloned(),
                };
                async move {
                    let result = export_sheet(ctx, schema, &request).await;
                    (schema, request.headers_for(schema), result)
                }
            })
            .buffered(self.sheet_concurrency())
            .collect()
            .await;

        let mut batch = ExportBatch::default();
        for (schema, headers, result) in results {
            match result {
                Ok(data) => batch.data_pumps.push(DataPump {
                    sheet_name: schema.sheet_name.to_string(),
                    column_headers: headers,
                    data,
                }),
                Err(e) => {
                    error!(sheet = schema.sheet_name, error = %e, "工作表导出失败");
                    batch.errors.push(SheetFailure {
                        sheet_name: schema.sheet_name.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            exported = batch.data_pumps.len(),
            failed = batch.errors.len(),
            "导出完成"
        );
        batch
    }

    /// 按 schema 表头顺序导出选中的工作表
    pub async fn export_data_by_workbook_sheet(
        &self,
        selected: &[String],
        property_ids: Option<&[String]>,
    ) -> ExportBatch {
        self.export_selected(selected, property_ids, None).await
    }

    /// 导出并写出 xlsx
    pub async fn export_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        selected: &[String],
        property_ids: Option<&[String]>,
        column_headers: Option<&BTreeMap<String, Vec<String>>>,
    ) -> DataPumpResult<ExportBatch> {
        let batch = self.export_selected(selected, property_ids, column_headers).await;
        write_workbook(path, &batch.data_pumps)?;
        Ok(batch)
    }
}
