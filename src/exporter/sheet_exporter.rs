// ==========================================
// 数据泵 - 单表导出编排
// ==========================================
// 流程: 查询 → 整形（id → 名称、展开嵌套、还原表头）→ 单元格转换
// 输出: 每行长度与调用方表头一致，第 i 格对应第 i 个表头
// ==========================================

use crate::context::PumpContext;
use crate::domain::cell::{CellValue, DataPumpRow};
use crate::exporter::cell_coercion::to_cell;
use crate::exporter::entity_shaper::shape_record;
use crate::exporter::error::{ExportError, ExportResult};
use crate::repository::{record_timezone, LookupCache, PropertyTimezones};
use crate::schema::constants::tables;
use crate::schema::{get_column_headers, SheetSchema};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// 单表导出请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// 仅导出这些物业的数据；None 或空表示全部
    pub property_ids_to_export: Option<Vec<String>>,
    /// 输出列顺序；None 时使用 schema 顺序
    pub column_headers: Option<Vec<String>>,
}

impl ExportRequest {
    /// 实际使用的表头
    pub fn headers_for(&self, schema: &SheetSchema) -> Vec<String> {
        match &self.column_headers {
            Some(headers) if !headers.is_empty() => headers.clone(),
            _ => get_column_headers(schema),
        }
    }
}

/// 导出一张表
///
/// # 参数
/// - ctx: 运行上下文
/// - schema: 工作表结构
/// - request: 物业范围与输出列顺序
///
/// # 返回
/// - Ok(rows): 与 `request.headers_for(schema)` 逐位对应的行
/// - Err: 查询或名称映射表加载失败
#[instrument(skip(ctx, schema, request), fields(sheet = schema.sheet_name))]
pub async fn export_sheet(
    ctx: &PumpContext,
    schema: &SheetSchema,
    request: &ExportRequest,
) -> ExportResult<Vec<DataPumpRow>> {
    let storage = ctx.storage.as_ref();
    let records = storage
        .query(schema, request.property_ids_to_export.as_deref())
        .await?;

    let cache = LookupCache::preload(storage, schema)
        .await
        .map_err(|source| ExportError::LookupFailed {
            table: schema.table.to_string(),
            source,
        })?;
    let timezones = PropertyTimezones::load_for(storage, schema)
        .await
        .map_err(|source| ExportError::LookupFailed {
            table: tables::PROPERTY.to_string(),
            source,
        })?;

    let headers = request.headers_for(schema);
    let unknown: Vec<&String> = headers
        .iter()
        .filter(|h| schema.column(h).is_none())
        .collect();
    if !unknown.is_empty() {
        debug!(unknown = ?unknown, "表头不在 schema 中，输出空单元格");
    }

    let rows: Vec<DataPumpRow> = records
        .iter()
        .map(|record| {
            let tz = record_timezone(schema, record, &timezones, ctx.default_timezone);
            let shaped = shape_record(schema, record, &cache);
            headers
                .iter()
                .map(|header| match shaped.get(header.as_str()) {
                    Some(value) => to_cell(schema.column(header), value, tz),
                    None => CellValue::Empty,
                })
                .collect()
        })
        .collect();

    info!(rows = rows.len(), columns = headers.len(), "工作表导出完成");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataPumpConfig;
    use crate::domain::entity::Entity;
    use crate::repository::{SqliteStorage, Storage};
    use crate::schema::sheets::leasing;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    async fn context(schema: &SheetSchema) -> PumpContext {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let storage = SqliteStorage::from_connection(Arc::new(Mutex::new(conn)));
        storage.ensure_table(schema).await.unwrap();
        PumpContext::new(Arc::new(storage), DataPumpConfig::default()).unwrap()
    }

    fn record(value: serde_json::Value) -> Entity {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_caller_header_order_is_honored() {
        let schema = leasing::lease_templates();
        let ctx = context(&schema).await;
        ctx.storage
            .upsert(
                &schema,
                &record(json!({
                    "name": "Lease",
                    "category": "Leasing",
                    "manuallySelected": true,
                    "sandboxTemplateId": null,
                })),
            )
            .await
            .unwrap();

        let request = ExportRequest {
            property_ids_to_export: None,
            column_headers: Some(vec![
                "manuallySelectedFlag".to_string(),
                "legacyColumn".to_string(),
                "name".to_string(),
                "sandboxTemplateId".to_string(),
            ]),
        };
        let rows = export_sheet(&ctx, &schema, &request).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            vec![
                CellValue::text("TRUE"),
                CellValue::Empty,
                CellValue::text("Lease"),
                CellValue::Empty,
            ]
        );
    }

    #[tokio::test]
    async fn test_default_headers_follow_schema() {
        let schema = leasing::lease_templates();
        let ctx = context(&schema).await;
        ctx.storage
            .upsert(&schema, &record(json!({"name": "Lease", "category": "Leasing"})))
            .await
            .unwrap();
        let rows = export_sheet(&ctx, &schema, &ExportRequest::default()).await.unwrap();
        assert_eq!(rows[0].len(), schema.columns.len());
        assert_eq!(rows[0][0], CellValue::text("Lease"));
    }
}
