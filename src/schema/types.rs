// ==========================================
// 数据泵 - Schema 类型定义
// ==========================================
// 职责: 工作表结构的静态描述（列、规则、引用、落库方式）
// 红线: 只描述结构，不执行校验，不访问存储
// ==========================================

use std::collections::BTreeSet;

// ==========================================
// 列描述
// ==========================================

/// 列的语义类型（决定单元格 → 实体值的转换）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    String,
    Number,
    Boolean,
    /// 逗号分隔的多值文本
    Array,
}

/// 列的附加格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    /// M/D/YYYY，按所属记录的时区落库
    Date,
}

/// 工作簿侧的校验元数据（下拉列表、受保护列）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationMeta {
    pub allowed_values: Vec<&'static str>,
    pub protected: bool,
}

/// 单字段校验规则
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    NotEmpty,
    Alphanumeric { max_len: usize },
    Numeric,
    Integer,
    Decimal,
    PositiveDecimal,
    PositiveInteger,
    MinValue(f64),
    MaxValue(f64),
    Boolean,
    Date,
    Percentage,
    Mail,
    MailArray,
    PhoneNumber,
    PostalCode,
    Url,
    TimeZone,
    NumericArray,
    InventoryName,
    ExistsIn(Vec<&'static str>),
}

/// 行级规则（涉及多个字段）
#[derive(Debug, Clone, PartialEq)]
pub enum RowRule {
    /// 所列字段至少一个非空
    AtLeastOneNotEmpty(Vec<&'static str>),
}

/// 名称引用解析的作用域
///
/// 目标表中按 `target_scope_field` 过滤，取值为本实体上已注入的 `related_id_field`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrerequisiteScope {
    pub related_id_field: &'static str,
    pub target_scope_field: &'static str,
}

/// 名称引用（前置依赖）描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrerequisiteSpec {
    /// 工作表中的列（表头）
    pub source_field: &'static str,
    pub target_table: &'static str,
    pub target_lookup_field: &'static str,
    /// 解析后注入的 id 字段（同时是落库字段）
    pub injected_id_field: &'static str,
    /// 逗号分隔多值，解析为有序 id 列表
    pub multi_value: bool,
    pub scope: Option<PrerequisiteScope>,
    /// 未解析时是否使该行无效
    pub required: bool,
}

impl PrerequisiteSpec {
    pub fn new(
        source_field: &'static str,
        target_table: &'static str,
        target_lookup_field: &'static str,
        injected_id_field: &'static str,
    ) -> Self {
        Self {
            source_field,
            target_table,
            target_lookup_field,
            injected_id_field,
            multi_value: false,
            scope: None,
            required: true,
        }
    }

    pub fn multi(mut self) -> Self {
        self.multi_value = true;
        self
    }

    pub fn scoped(mut self, related_id_field: &'static str, target_scope_field: &'static str) -> Self {
        self.scope = Some(PrerequisiteScope {
            related_id_field,
            target_scope_field,
        });
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// 列描述
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub header: &'static str,
    pub semantic_type: SemanticType,
    pub format: Option<ColumnFormat>,
    /// 与表头不同的 DB 字段名
    pub db_field: Option<&'static str>,
    pub rules: Vec<FieldRule>,
    pub validation_meta: Option<ValidationMeta>,
    pub prerequisite: Option<PrerequisiteSpec>,
}

impl ColumnSpec {
    fn new(header: &'static str, semantic_type: SemanticType) -> Self {
        Self {
            header,
            semantic_type,
            format: None,
            db_field: None,
            rules: Vec::new(),
            validation_meta: None,
            prerequisite: None,
        }
    }

    pub fn text(header: &'static str) -> Self {
        Self::new(header, SemanticType::String)
    }

    /// 数值列（隐含 NUMERIC 规则）
    pub fn number(header: &'static str) -> Self {
        Self::new(header, SemanticType::Number).rule(FieldRule::Numeric)
    }

    /// 布尔列（隐含 BOOLEAN 规则）
    pub fn boolean(header: &'static str) -> Self {
        Self::new(header, SemanticType::Boolean).rule(FieldRule::Boolean)
    }

    pub fn array(header: &'static str) -> Self {
        Self::new(header, SemanticType::Array)
    }

    /// 日期列（隐含 DATE 规则）
    pub fn date(header: &'static str) -> Self {
        let mut column = Self::new(header, SemanticType::String).rule(FieldRule::Date);
        column.format = Some(ColumnFormat::Date);
        column
    }

    /// 必填：NOT_EMPTY 放在规则最前，失败时短路后续规则
    pub fn required(mut self) -> Self {
        self.rules.insert(0, FieldRule::NotEmpty);
        self
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn db_field(mut self, field: &'static str) -> Self {
        self.db_field = Some(field);
        self
    }

    /// 取值限定在枚举内（大小写不敏感）
    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.rules.push(FieldRule::ExistsIn(values.to_vec()));
        self.validation_meta
            .get_or_insert_with(ValidationMeta::default)
            .allowed_values = values.to_vec();
        self
    }

    pub fn protected(mut self) -> Self {
        self.validation_meta
            .get_or_insert_with(ValidationMeta::default)
            .protected = true;
        self
    }

    pub fn references(mut self, prerequisite: PrerequisiteSpec) -> Self {
        self.prerequisite = Some(prerequisite);
        self
    }

    /// 非引用列落库时的字段名
    pub fn stored_name(&self) -> &'static str {
        self.db_field.unwrap_or(self.header)
    }

    pub fn is_date(&self) -> bool {
        self.format == Some(ColumnFormat::Date)
    }

    /// 两段式表头 "section\nfield"
    pub fn split_section(&self) -> Option<(&'static str, &'static str)> {
        self.header.split_once('\n')
    }
}

// ==========================================
// 表级描述
// ==========================================

/// 落库方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistMode {
    /// 按自然键（可为复合键，DB 字段名）插入或更新
    Upsert { natural_key: Vec<&'static str> },
    /// 无逐行自然键：整表清空后批量写入（单事务）
    ReplaceAll,
}

/// 实体形态（表头 → 存储对象的折叠方式）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityShape {
    Flat,
    /// 所有 "section\nfield" 列折叠到一个 JSON 对象字段
    NestedSettings { field: &'static str },
    /// 指定列折叠到一个 JSON 子对象：(表头, 成员键)
    Embedded {
        field: &'static str,
        members: Vec<(&'static str, &'static str)>,
    },
}

/// 记录所属时区的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimezoneSource {
    /// 使用配置的默认时区
    Default,
    /// 记录自身的时区字段（DB 字段名）
    OwnField(&'static str),
    /// 通过注入的物业 id 查物业时区
    ViaProperty(&'static str),
}

/// 导出时按物业过滤的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyScope {
    /// 记录本身就是物业
    SelfId,
    /// 单个物业 id 字段
    Id(&'static str),
    /// 物业 id 列表字段
    IdList(&'static str),
}

/// 自定义（跨行/业务）校验种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomCheckKind {
    /// 关账计划的月份连续性与滚动日期顺序
    CloseScheduleContinuity,
    /// 两个模板 id 不得相同
    DistinctTemplateIds,
    /// 同一团队内成员不得重复
    UniqueTeamMember,
    /// 物业设置的条件必填
    PropertySettingRules,
    /// 费用类型决定的字段组合
    FeeTypeRules,
}

impl CustomCheckKind {
    /// 依赖行顺序的校验要求逐行落库
    pub fn order_dependent(&self) -> bool {
        matches!(self, CustomCheckKind::CloseScheduleContinuity)
    }

    /// 是否需要预加载物业时区
    pub fn needs_property_timezones(&self) -> bool {
        matches!(self, CustomCheckKind::CloseScheduleContinuity)
    }
}

/// 存储字段的值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredKind {
    Text,
    Real,
    Bool,
    Json,
    Timestamp,
    Id,
    IdList,
}

impl StoredKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            StoredKind::Real => "REAL",
            StoredKind::Bool => "INTEGER",
            _ => "TEXT",
        }
    }
}

/// 存储字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredField {
    pub name: &'static str,
    pub kind: StoredKind,
}

/// 工作表结构（进程内只构建一次，不可变）
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSchema {
    pub sheet_name: &'static str,
    pub table: &'static str,
    pub columns: Vec<ColumnSpec>,
    pub row_rules: Vec<RowRule>,
    pub persist: PersistMode,
    pub shape: EntityShape,
    pub timezone: TimezoneSource,
    pub property_scope: Option<PropertyScope>,
    /// 导出排序字段（DB 字段名）；为空时按自然键
    pub export_order: Vec<&'static str>,
    pub custom: Option<CustomCheckKind>,
    /// 带名称引用的表头
    pub foreign_keys: BTreeSet<&'static str>,
    /// 折叠进嵌入对象的表头
    pub custom_keys: BTreeSet<&'static str>,
}

impl SheetSchema {
    pub fn builder(sheet_name: &'static str, table: &'static str) -> SheetSchemaBuilder {
        SheetSchemaBuilder {
            schema: SheetSchema {
                sheet_name,
                table,
                columns: Vec::new(),
                row_rules: Vec::new(),
                persist: PersistMode::Upsert {
                    natural_key: vec!["name"],
                },
                shape: EntityShape::Flat,
                timezone: TimezoneSource::Default,
                property_scope: None,
                export_order: Vec::new(),
                custom: None,
                foreign_keys: BTreeSet::new(),
                custom_keys: BTreeSet::new(),
            },
        }
    }

    pub fn column(&self, header: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.header == header)
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }

    /// 所有名称引用（独立引用在前，带作用域的在后）
    pub fn prerequisites(&self) -> Vec<&PrerequisiteSpec> {
        let mut specs: Vec<&PrerequisiteSpec> = self
            .columns
            .iter()
            .filter_map(|c| c.prerequisite.as_ref())
            .collect();
        specs.sort_by_key(|p| p.scope.is_some());
        specs
    }

    /// 逐行解析的名称引用（不含指向本表的引用）
    pub fn row_prerequisites(&self) -> Vec<&PrerequisiteSpec> {
        self.prerequisites()
            .into_iter()
            .filter(|p| p.target_table != self.table)
            .collect()
    }

    /// 指向本表的引用（父级、关联项），在本批行落库后解析
    pub fn self_references(&self) -> Vec<&PrerequisiteSpec> {
        self.prerequisites()
            .into_iter()
            .filter(|p| p.target_table == self.table)
            .collect()
    }

    /// 依赖的目标表（不含自身）
    pub fn dependency_tables(&self) -> BTreeSet<&'static str> {
        self.columns
            .iter()
            .filter_map(|c| c.prerequisite.as_ref())
            .map(|p| p.target_table)
            .filter(|t| *t != self.table)
            .collect()
    }

    /// 该列是否被折叠进嵌套/嵌入对象
    pub fn folded_into(&self, column: &ColumnSpec) -> Option<&'static str> {
        match &self.shape {
            EntityShape::NestedSettings { field } if column.split_section().is_some() => {
                Some(*field)
            }
            EntityShape::Embedded { field, members }
                if members.iter().any(|(h, _)| *h == column.header) =>
            {
                Some(*field)
            }
            _ => None,
        }
    }

    /// 落库字段（按列顺序去重）
    pub fn stored_fields(&self) -> Vec<StoredField> {
        let mut fields: Vec<StoredField> = Vec::new();
        for column in &self.columns {
            let field = if let Some(p) = &column.prerequisite {
                StoredField {
                    name: p.injected_id_field,
                    kind: if p.multi_value {
                        StoredKind::IdList
                    } else {
                        StoredKind::Id
                    },
                }
            } else if let Some(object_field) = self.folded_into(column) {
                StoredField {
                    name: object_field,
                    kind: StoredKind::Json,
                }
            } else {
                let kind = match (column.semantic_type, column.format) {
                    (_, Some(ColumnFormat::Date)) => StoredKind::Timestamp,
                    (SemanticType::Number, _) => StoredKind::Real,
                    (SemanticType::Boolean, _) => StoredKind::Bool,
                    (SemanticType::Array, _) => StoredKind::Json,
                    (SemanticType::String, _) => StoredKind::Text,
                };
                StoredField {
                    name: column.stored_name(),
                    kind,
                }
            };
            if !fields.iter().any(|f| f.name == field.name) {
                fields.push(field);
            }
        }
        fields
    }

    pub fn natural_key(&self) -> &[&'static str] {
        match &self.persist {
            PersistMode::Upsert { natural_key } => natural_key,
            PersistMode::ReplaceAll => &[],
        }
    }

    /// 导出排序字段
    pub fn order_fields(&self) -> Vec<&'static str> {
        if self.export_order.is_empty() {
            self.natural_key().to_vec()
        } else {
            self.export_order.clone()
        }
    }

    /// 自然键字段对应的表头（用于把落库错误挂到单元格上）
    pub fn header_for_stored(&self, stored: &str) -> Option<&'static str> {
        self.columns.iter().find_map(|c| match &c.prerequisite {
            Some(p) if p.injected_id_field == stored => Some(c.header),
            None if c.stored_name() == stored && self.folded_into(c).is_none() => Some(c.header),
            _ => None,
        })
    }

    pub fn is_order_dependent(&self) -> bool {
        self.custom.map(|c| c.order_dependent()).unwrap_or(false)
    }
}

// ==========================================
// SheetSchemaBuilder
// ==========================================
pub struct SheetSchemaBuilder {
    schema: SheetSchema,
}

impl SheetSchemaBuilder {
    pub fn columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.schema.columns = columns;
        self
    }

    pub fn row_rule(mut self, rule: RowRule) -> Self {
        self.schema.row_rules.push(rule);
        self
    }

    pub fn natural_key(mut self, fields: &[&'static str]) -> Self {
        self.schema.persist = PersistMode::Upsert {
            natural_key: fields.to_vec(),
        };
        self
    }

    pub fn replace_all(mut self) -> Self {
        self.schema.persist = PersistMode::ReplaceAll;
        self
    }

    pub fn shape(mut self, shape: EntityShape) -> Self {
        self.schema.shape = shape;
        self
    }

    pub fn timezone(mut self, source: TimezoneSource) -> Self {
        self.schema.timezone = source;
        self
    }

    pub fn property_scope(mut self, scope: PropertyScope) -> Self {
        self.schema.property_scope = Some(scope);
        self
    }

    pub fn export_order(mut self, fields: &[&'static str]) -> Self {
        self.schema.export_order = fields.to_vec();
        self
    }

    pub fn custom(mut self, kind: CustomCheckKind) -> Self {
        self.schema.custom = Some(kind);
        self
    }

    pub fn build(mut self) -> SheetSchema {
        let foreign_keys: BTreeSet<&'static str> = self
            .schema
            .columns
            .iter()
            .filter(|c| c.prerequisite.is_some())
            .map(|c| c.header)
            .collect();
        let custom_keys: BTreeSet<&'static str> = match &self.schema.shape {
            EntityShape::Embedded { members, .. } => members.iter().map(|(h, _)| *h).collect(),
            _ => BTreeSet::new(),
        };
        self.schema.foreign_keys = foreign_keys;
        self.schema.custom_keys = custom_keys;
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building_like() -> SheetSchema {
        SheetSchema::builder("Buildings", "Building")
            .columns(vec![
                ColumnSpec::text("name").required(),
                ColumnSpec::text("property")
                    .required()
                    .references(PrerequisiteSpec::new("property", "Property", "name", "propertyId")),
                ColumnSpec::array("amenities").references(
                    PrerequisiteSpec::new("amenities", "Amenity", "name", "amenityIds")
                        .multi()
                        .scoped("propertyId", "propertyId"),
                ),
                ColumnSpec::number("floorCount"),
                ColumnSpec::date("startDate"),
                ColumnSpec::boolean("inactiveFlag"),
            ])
            .natural_key(&["name", "propertyId"])
            .build()
    }

    #[test]
    fn test_stored_fields_follow_column_order() {
        let schema = building_like();
        let fields: Vec<(&str, StoredKind)> = schema
            .stored_fields()
            .into_iter()
            .map(|f| (f.name, f.kind))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("name", StoredKind::Text),
                ("propertyId", StoredKind::Id),
                ("amenityIds", StoredKind::IdList),
                ("floorCount", StoredKind::Real),
                ("startDate", StoredKind::Timestamp),
                ("inactiveFlag", StoredKind::Bool),
            ]
        );
    }

    #[test]
    fn test_prerequisites_standalone_first() {
        let schema = building_like();
        let specs = schema.prerequisites();
        assert_eq!(specs[0].source_field, "property");
        assert_eq!(specs[1].source_field, "amenities");
        assert!(schema.foreign_keys.contains("amenities"));
        assert_eq!(schema.dependency_tables().len(), 2);
    }

    #[test]
    fn test_self_references_are_split_out() {
        let schema = SheetSchema::builder("Inventory", "Inventory")
            .columns(vec![
                ColumnSpec::text("name").required(),
                ColumnSpec::text("property")
                    .required()
                    .references(PrerequisiteSpec::new("property", "Property", "name", "propertyId")),
                ColumnSpec::text("parentInventory").references(
                    PrerequisiteSpec::new("parentInventory", "Inventory", "name", "parentInventoryId")
                        .optional()
                        .scoped("propertyId", "propertyId"),
                ),
            ])
            .natural_key(&["name", "propertyId"])
            .build();
        let row: Vec<&str> = schema.row_prerequisites().iter().map(|p| p.source_field).collect();
        let deferred: Vec<&str> = schema.self_references().iter().map(|p| p.source_field).collect();
        assert_eq!(row, vec!["property"]);
        assert_eq!(deferred, vec!["parentInventory"]);
        assert_eq!(schema.dependency_tables().len(), 1);
    }

    #[test]
    fn test_required_puts_not_empty_first() {
        let column = ColumnSpec::number("month").required();
        assert_eq!(column.rules[0], FieldRule::NotEmpty);
        assert_eq!(column.rules[1], FieldRule::Numeric);
    }

    #[test]
    fn test_nested_settings_fold_into_one_field() {
        let schema = SheetSchema::builder("Global Settings", "GlobalSetting")
            .columns(vec![
                ColumnSpec::text("communications\nfooterNotice"),
                ColumnSpec::boolean("preferences\nhidePropertyLifestyles"),
            ])
            .replace_all()
            .shape(EntityShape::NestedSettings { field: "settings" })
            .build();
        let fields = schema.stored_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "settings");
        assert!(schema.natural_key().is_empty());
    }
}
