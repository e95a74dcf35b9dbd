// ==========================================
// 数据泵 - 租约相关工作表
// ==========================================
// Lease Names / Lease Terms / Lease Templates
// ==========================================

use crate::schema::constants::{sheet_names, tables, PROPERTY_ID_FIELD};
use crate::schema::sheets::inventory::INVENTORY_TYPES;
use crate::schema::types::{
    ColumnSpec, CustomCheckKind, FieldRule, PrerequisiteSpec, PropertyScope, SheetSchema,
};

pub const LEASE_PERIODS: [&str; 4] = ["month", "week", "day", "hour"];
pub const LEASE_STATES: [&str; 2] = ["new", "renewal"];

pub fn lease_names() -> SheetSchema {
    SheetSchema::builder(sheet_names::LEASE_NAMES, tables::LEASE_NAME)
        .columns(vec![
            ColumnSpec::text("name").required(),
            ColumnSpec::text("property")
                .required()
                .references(PrerequisiteSpec::new(
                    "property",
                    tables::PROPERTY,
                    "name",
                    PROPERTY_ID_FIELD,
                )),
            ColumnSpec::text("description"),
            ColumnSpec::text("inventoryType")
                .required()
                .one_of(&INVENTORY_TYPES),
            ColumnSpec::boolean("inactiveFlag").db_field("inactive"),
        ])
        .natural_key(&["name", PROPERTY_ID_FIELD])
        .export_order(&[PROPERTY_ID_FIELD, "name"])
        .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
        .build()
}

pub fn lease_terms() -> SheetSchema {
    SheetSchema::builder(sheet_names::LEASE_TERMS, tables::LEASE_TERM)
        .columns(vec![
            ColumnSpec::text("leaseName").required().references(
                PrerequisiteSpec::new("leaseName", tables::LEASE_NAME, "name", "leaseNameId")
                    .scoped(PROPERTY_ID_FIELD, PROPERTY_ID_FIELD),
            ),
            ColumnSpec::text("property")
                .required()
                .references(PrerequisiteSpec::new(
                    "property",
                    tables::PROPERTY,
                    "name",
                    PROPERTY_ID_FIELD,
                )),
            ColumnSpec::number("length")
                .required()
                .rule(FieldRule::PositiveInteger),
            ColumnSpec::text("period").required().one_of(&LEASE_PERIODS),
            ColumnSpec::number("relativeAdjustment").rule(FieldRule::Percentage),
            ColumnSpec::number("absoluteAdjustment").rule(FieldRule::Decimal),
            ColumnSpec::array("state").one_of(&LEASE_STATES),
            ColumnSpec::boolean("inactiveFlag").db_field("inactive"),
        ])
        .natural_key(&["leaseNameId", "length", "period"])
        .export_order(&[PROPERTY_ID_FIELD, "leaseNameId", "period", "length"])
        .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
        .build()
}

pub fn lease_templates() -> SheetSchema {
    SheetSchema::builder(sheet_names::LEASE_TEMPLATES, tables::LEASE_TEMPLATE)
        .columns(vec![
            ColumnSpec::text("name").required(),
            ColumnSpec::text("category").required(),
            ColumnSpec::text("displayName"),
            ColumnSpec::boolean("manuallySelectedFlag").db_field("manuallySelected"),
            ColumnSpec::text("sandboxTemplateId"),
            ColumnSpec::text("prodTemplateId"),
        ])
        .natural_key(&["name"])
        .custom(CustomCheckKind::DistinctTemplateIds)
        .build()
}
