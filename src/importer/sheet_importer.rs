// ==========================================
// 数据泵 - 单表导入编排
// ==========================================
// 流程（逐行）: 字段校验 → 引用解析 → 自定义校验 → 落库
// - 行之间相互独立，行级错误汇总为 ImportOutcome
// - 已落库的行不因后续行失败而回滚（ReplaceAll 表除外）
// - 依赖行顺序的表逐行等待落库；其余表可有限并行落库
// - 指向本表的引用在本批行落库后解析并回写
// 红线: 行级问题不走 Err；只有整表问题（缺列、查找表失败）返回 Err
// ==========================================

use crate::config::DataPumpConfig;
use crate::context::PumpContext;
use crate::domain::cell::SheetRow;
use crate::domain::entity::{text_of, Entity};
use crate::domain::outcome::{FieldError, ImportOutcome, RowValidationResult};
use crate::importer::custom_validator::{build_custom_check, BatchLookups, CustomCheck};
use crate::importer::entity_mapper::{entity_to_record, row_to_entity};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_validator::validate_row;
use crate::importer::prerequisite_resolver::{lookup_key, resolve_prerequisites};
use crate::repository::{LookupCache, PropertyTimezones, RepositoryError};
use crate::schema::constants::tables;
use crate::schema::{FieldRule, PersistMode, PrerequisiteSpec, SheetSchema};
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

// ==========================================
// ImportOptions - 单表导入参数
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// 无顺序依赖时的并行落库数（1 = 逐行）
    pub persist_parallelism: usize,
    /// 超过此时刻不再处理剩余行
    pub deadline: Option<Instant>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            persist_parallelism: 1,
            deadline: None,
        }
    }
}

impl ImportOptions {
    /// 按配置生成参数（截止时刻从调用时开始计算）
    pub fn from_config(config: &DataPumpConfig) -> Self {
        Self {
            persist_parallelism: config.persist_parallelism.max(1),
            deadline: config
                .row_timeout_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
        }
    }

    fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }
}

/// schema 要求但工作表中缺失的表头
///
/// 只检查必填列；可选列缺失时按空值处理。
pub fn missing_headers(schema: &SheetSchema, headers: &[String]) -> Vec<String> {
    schema
        .columns
        .iter()
        .filter(|c| c.rules.contains(&FieldRule::NotEmpty))
        .filter(|c| !headers.iter().any(|h| h.trim() == c.header))
        .map(|c| c.header.to_string())
        .collect()
}

/// 落库错误挂载的字段（自然键第一列）
fn persistence_field(schema: &SheetSchema) -> &'static str {
    schema
        .natural_key()
        .first()
        .and_then(|key| schema.header_for_stored(key))
        .or_else(|| schema.columns.first().map(|c| c.header))
        .unwrap_or("id")
}

/// 批次级查找表（名称 → id）
async fn load_lookups(ctx: &PumpContext, specs: &[&PrerequisiteSpec]) -> ImportResult<LookupCache> {
    let mut cache = LookupCache::default();
    for spec in specs {
        cache
            .load(ctx.storage.as_ref(), lookup_key(spec))
            .await
            .map_err(|source| ImportError::LookupFailed {
                table: spec.target_table.to_string(),
                source,
            })?;
    }
    Ok(cache)
}

/// 导入一张表
///
/// # 参数
/// - ctx: 运行上下文
/// - schema: 工作表结构
/// - headers: 工作表中的表头（原始顺序）
/// - rows: 按表头索引的数据行（不含表头行）
/// - options: 并行度与截止时刻
///
/// # 返回
/// - Ok(ImportOutcome): 行级错误（行号从 1 开始，表头为第 0 行）与落库行数
/// - Err: 缺列、查找表加载失败、整表替换失败
#[instrument(skip(ctx, schema, headers, rows, options), fields(sheet = schema.sheet_name, rows = rows.len()))]
pub async fn import_sheet(
    ctx: &PumpContext,
    schema: &SheetSchema,
    headers: &[String],
    rows: &[SheetRow],
    options: ImportOptions,
) -> ImportResult<ImportOutcome> {
    let missing = missing_headers(schema, headers);
    if !missing.is_empty() {
        warn!(missing = %missing.join(", "), "工作表缺少必需表头");
        return Err(ImportError::MissingColumns(missing));
    }

    // === 批次级预加载 ===
    let specs = schema.row_prerequisites();
    let cache = load_lookups(ctx, &specs).await?;
    let timezones = PropertyTimezones::load_for(ctx.storage.as_ref(), schema)
        .await
        .map_err(|source| ImportError::LookupFailed {
            table: tables::PROPERTY.to_string(),
            source,
        })?;

    // === 类型化 + 引用解析（自定义校验需要完整的兄弟行） ===
    let mut entities: Vec<Entity> = Vec::with_capacity(rows.len());
    let mut prerequisite_errors: Vec<Vec<FieldError>> = Vec::with_capacity(rows.len());
    for row in rows {
        let mut entity = row_to_entity(schema, row);
        prerequisite_errors.push(resolve_prerequisites(&mut entity, &specs, &cache));
        entities.push(entity);
    }

    let mut custom: Option<Box<dyn CustomCheck>> = schema.custom.map(|kind| {
        build_custom_check(
            kind,
            &BatchLookups {
                property_timezones: timezones.clone(),
                default_timezone: ctx.default_timezone,
                now: ctx.now,
            },
        )
    });

    let replace_all = matches!(schema.persist, PersistMode::ReplaceAll);
    let parallel = !replace_all && !schema.is_order_dependent() && options.persist_parallelism > 1;
    let error_field = persistence_field(schema);

    let mut outcome = ImportOutcome::default();
    let mut pending: Vec<(usize, Entity)> = Vec::new();
    // 已落库行的行号
    let mut persisted: Vec<usize> = Vec::new();

    for (i, (row, entity)) in rows.iter().zip(entities.iter()).enumerate() {
        if options.expired() {
            outcome.skipped_rows = rows.len() - i;
            warn!(skipped = outcome.skipped_rows, "导入超时，剩余行未处理");
            break;
        }
        let row_index = i + 1;

        // 1. 字段校验
        let mut errors = validate_row(schema, row);

        // 2. 引用解析
        if errors.is_empty() {
            errors = prerequisite_errors[i].clone();
        }

        // 3. 自定义校验
        if errors.is_empty() {
            if let Some(check) = custom.as_mut() {
                errors = check.check(entity, i, &entities);
            }
        }

        if !errors.is_empty() {
            debug!(row = row_index, errors = errors.len(), "行校验未通过");
            outcome.record_row(RowValidationResult::new(row_index, errors));
            continue;
        }

        // 4. 落库
        let record = entity_to_record(schema, entity, &timezones, ctx.default_timezone);
        if replace_all || parallel {
            pending.push((row_index, record));
            continue;
        }
        match ctx.storage.upsert(schema, &record).await {
            Ok(id) => {
                debug!(row = row_index, id = %id, "行已落库");
                outcome.persisted_rows += 1;
                persisted.push(row_index);
            }
            Err(e) => {
                warn!(row = row_index, error = %e, "行落库失败");
                outcome.record_row(RowValidationResult::new(
                    row_index,
                    vec![FieldError::persistence(error_field, e.to_string())],
                ));
            }
        }
    }

    if replace_all {
        if outcome.invalid_fields.is_empty() && outcome.skipped_rows == 0 {
            let records: Vec<Entity> = pending.into_iter().map(|(_, r)| r).collect();
            outcome.persisted_rows = ctx.storage.replace_all(schema, &records).await?;
        } else {
            warn!(
                invalid = outcome.invalid_fields.len(),
                "整表替换的工作表存在无效行，不落库"
            );
        }
    } else if parallel {
        persisted = persist_parallel(
            ctx,
            schema,
            pending,
            options.persist_parallelism,
            error_field,
            &mut outcome,
        )
        .await;
    }

    let self_specs = schema.self_references();
    if !replace_all && !self_specs.is_empty() && !persisted.is_empty() {
        persisted.sort_unstable();
        let linking = SelfLinking {
            specs: &self_specs,
            timezones: &timezones,
            error_field,
        };
        link_self_references(ctx, schema, &linking, &entities, &persisted, &mut outcome).await?;
    }

    outcome.invalid_fields.sort_by_key(|f| f.row_index);
    info!(
        persisted = outcome.persisted_rows,
        invalid = outcome.invalid_fields.len(),
        skipped = outcome.skipped_rows,
        "工作表导入完成"
    );
    Ok(outcome)
}

/// 有限并行落库（仅用于无顺序依赖的表）
///
/// # 返回
/// - 成功落库的行号
async fn persist_parallel(
    ctx: &PumpContext,
    schema: &SheetSchema,
    pending: Vec<(usize, Entity)>,
    parallelism: usize,
    error_field: &'static str,
    outcome: &mut ImportOutcome,
) -> Vec<usize> {
    let results: Vec<(usize, Result<String, RepositoryError>)> = stream::iter(pending)
        .map(|(row_index, record)| {
            let storage = ctx.storage.clone();
            async move { (row_index, storage.upsert(schema, &record).await) }
        })
        .buffer_unordered(parallelism)
        .collect()
        .await;

    let mut persisted = Vec::with_capacity(results.len());
    for (row_index, result) in results {
        match result {
            Ok(_) => {
                outcome.persisted_rows += 1;
                persisted.push(row_index);
            }
            Err(e) => {
                warn!(row = row_index, error = %e, "行落库失败");
                outcome.record_row(RowValidationResult::new(
                    row_index,
                    vec![FieldError::persistence(error_field, e.to_string())],
                ));
            }
        }
    }
    persisted
}

/// 同表引用解析所需的批次数据
struct SelfLinking<'a> {
    specs: &'a [&'a PrerequisiteSpec],
    timezones: &'a PropertyTimezones,
    error_field: &'static str,
}

/// 解析指向本表的引用并按自然键回写
///
/// 查找表在本批行落库后重新加载，引用可以指向同一批中的任意行。
/// 未解析的必填引用报告在对应行上，该行保留首轮落库的结果。
async fn link_self_references(
    ctx: &PumpContext,
    schema: &SheetSchema,
    linking: &SelfLinking<'_>,
    entities: &[Entity],
    persisted: &[usize],
    outcome: &mut ImportOutcome,
) -> ImportResult<()> {
    let cache = load_lookups(ctx, linking.specs).await?;
    let mut linked = 0usize;

    for &row_index in persisted {
        let Some(entity) = entities.get(row_index - 1) else {
            continue;
        };
        if linking
            .specs
            .iter()
            .all(|spec| text_of(entity, spec.source_field).is_none())
        {
            continue;
        }

        let mut entity = entity.clone();
        let errors = resolve_prerequisites(&mut entity, linking.specs, &cache);
        if !errors.is_empty() {
            debug!(row = row_index, errors = errors.len(), "同表引用未解析");
            outcome.record_row(RowValidationResult::new(row_index, errors));
            continue;
        }

        let record = entity_to_record(schema, &entity, linking.timezones, ctx.default_timezone);
        match ctx.storage.upsert(schema, &record).await {
            Ok(_) => linked += 1,
            Err(e) => {
                warn!(row = row_index, error = %e, "同表引用回写失败");
                outcome.record_row(RowValidationResult::new(
                    row_index,
                    vec![FieldError::persistence(linking.error_field, e.to_string())],
                ));
            }
        }
    }

    debug!(linked, "同表引用已回写");
    Ok(())
}
