// ==========================================
// 数据泵 - 房源相关工作表
// ==========================================
// Amenities / Buildings / Layouts / Inventory Groups / Inventory
// 名称在物业内唯一，引用按物业作用域解析
// ==========================================

use crate::schema::constants::{sheet_names, tables, PROPERTY_ID_FIELD};
use crate::schema::types::{
    ColumnSpec, FieldRule, PrerequisiteSpec, PropertyScope, SheetSchema, TimezoneSource,
};

pub const AMENITY_CATEGORIES: [&str; 3] = ["property", "building", "inventory"];
pub const INVENTORY_TYPES: [&str; 3] = ["unit", "parking", "storage"];
pub const INVENTORY_STATES: [&str; 5] = ["vacantReady", "vacantMakeReady", "occupied", "model", "down"];
pub const ECONOMIC_STATUSES: [&str; 4] = ["commercial", "industrial", "residential", "retail"];

fn property_column() -> ColumnSpec {
    ColumnSpec::text("property")
        .required()
        .references(PrerequisiteSpec::new(
            "property",
            tables::PROPERTY,
            "name",
            PROPERTY_ID_FIELD,
        ))
}

/// 物业内同名对象的引用
fn scoped_reference(
    header: &'static str,
    table: &'static str,
    injected_id_field: &'static str,
) -> PrerequisiteSpec {
    PrerequisiteSpec::new(header, table, "name", injected_id_field)
        .scoped(PROPERTY_ID_FIELD, PROPERTY_ID_FIELD)
}

/// 物业内的设施引用（多值）
fn amenities_column() -> ColumnSpec {
    ColumnSpec::array("amenities").references(
        PrerequisiteSpec::new("amenities", tables::AMENITY, "name", "amenityIds")
            .multi()
            .scoped(PROPERTY_ID_FIELD, PROPERTY_ID_FIELD),
    )
}

fn address_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::text("addressLine1"),
        ColumnSpec::text("addressLine2"),
        ColumnSpec::text("city"),
        ColumnSpec::text("state"),
        ColumnSpec::text("postalCode").rule(FieldRule::PostalCode),
    ]
}

pub fn amenities() -> SheetSchema {
    SheetSchema::builder(sheet_names::AMENITIES, tables::AMENITY)
        .columns(vec![
            ColumnSpec::text("name").required().protected(),
            property_column().protected(),
            ColumnSpec::text("category")
                .required()
                .one_of(&AMENITY_CATEGORIES)
                .protected(),
            ColumnSpec::text("subCategory"),
            ColumnSpec::text("displayName").required(),
            ColumnSpec::text("description"),
            ColumnSpec::boolean("hidden"),
            ColumnSpec::number("relativePrice").rule(FieldRule::Percentage),
            ColumnSpec::number("absolutePrice").rule(FieldRule::PositiveDecimal),
            ColumnSpec::boolean("targetUnit"),
            ColumnSpec::text("infographicName"),
            ColumnSpec::number("order").rule(FieldRule::Integer),
            ColumnSpec::date("endDate"),
        ])
        .natural_key(&["name", "category", PROPERTY_ID_FIELD])
        .export_order(&[PROPERTY_ID_FIELD, "category", "name"])
        .timezone(TimezoneSource::ViaProperty(PROPERTY_ID_FIELD))
        .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
        .build()
}

pub fn buildings() -> SheetSchema {
    let mut columns = vec![
        ColumnSpec::text("name")
            .required()
            .rule(FieldRule::InventoryName),
        ColumnSpec::text("displayName").required(),
        property_column(),
        ColumnSpec::text("type"),
        ColumnSpec::text("description"),
    ];
    columns.extend(address_columns());
    columns.extend(vec![
        ColumnSpec::date("startDate"),
        ColumnSpec::date("endDate"),
        ColumnSpec::number("floorCount").rule(FieldRule::PositiveInteger),
        ColumnSpec::number("surfaceArea").rule(FieldRule::PositiveDecimal),
        amenities_column(),
        ColumnSpec::text("externalId"),
        ColumnSpec::boolean("inactiveFlag").db_field("inactive"),
    ]);

    SheetSchema::builder(sheet_names::BUILDINGS, tables::BUILDING)
        .columns(columns)
        .natural_key(&["name", PROPERTY_ID_FIELD])
        .export_order(&[PROPERTY_ID_FIELD, "name"])
        .timezone(TimezoneSource::ViaProperty(PROPERTY_ID_FIELD))
        .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
        .build()
}

pub fn layouts() -> SheetSchema {
    SheetSchema::builder(sheet_names::LAYOUTS, tables::LAYOUT)
        .columns(vec![
            ColumnSpec::text("name").required(),
            property_column(),
            ColumnSpec::text("displayName").required(),
            ColumnSpec::text("description"),
            ColumnSpec::text("inventoryType")
                .required()
                .one_of(&INVENTORY_TYPES),
            ColumnSpec::number("numBedrooms").rule(FieldRule::PositiveInteger),
            ColumnSpec::number("numBathrooms").rule(FieldRule::PositiveDecimal),
            ColumnSpec::number("surfaceArea").rule(FieldRule::PositiveDecimal),
            ColumnSpec::number("floorCount").rule(FieldRule::PositiveInteger),
            amenities_column(),
            ColumnSpec::boolean("inactiveFlag").db_field("inactive"),
            ColumnSpec::text("externalId"),
        ])
        .natural_key(&["name", PROPERTY_ID_FIELD])
        .export_order(&[PROPERTY_ID_FIELD, "name"])
        .timezone(TimezoneSource::ViaProperty(PROPERTY_ID_FIELD))
        .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
        .build()
}

/// 房源分组：定价、租约名称与默认费用挂在分组上
pub fn inventory_groups() -> SheetSchema {
    SheetSchema::builder(sheet_names::INVENTORY_GROUPS, tables::INVENTORY_GROUP)
        .columns(vec![
            ColumnSpec::text("name").required(),
            property_column(),
            ColumnSpec::text("displayName").required(),
            ColumnSpec::text("description"),
            ColumnSpec::text("inventoryType")
                .required()
                .one_of(&INVENTORY_TYPES),
            ColumnSpec::text("leaseName").references(scoped_reference(
                "leaseName",
                tables::LEASE_NAME,
                "leaseNameId",
            )),
            ColumnSpec::number("basePriceMonthly").rule(FieldRule::PositiveDecimal),
            ColumnSpec::number("basePriceWeekly").rule(FieldRule::PositiveDecimal),
            ColumnSpec::number("basePriceDaily").rule(FieldRule::PositiveDecimal),
            ColumnSpec::number("basePriceHourly").rule(FieldRule::PositiveDecimal),
            ColumnSpec::text("feeName").references(scoped_reference("feeName", tables::FEE, "feeId")),
            ColumnSpec::boolean("primaryRentableFlag").db_field("primaryRentable"),
            amenities_column(),
            ColumnSpec::text("economicStatus").one_of(&ECONOMIC_STATUSES),
            ColumnSpec::boolean("rentControlFlag").db_field("rentControl"),
            ColumnSpec::boolean("affordableFlag").db_field("affordable"),
            ColumnSpec::boolean("inactiveFlag").db_field("inactive"),
            ColumnSpec::text("externalId"),
        ])
        .natural_key(&["name", PROPERTY_ID_FIELD])
        .export_order(&[PROPERTY_ID_FIELD, "name"])
        .timezone(TimezoneSource::ViaProperty(PROPERTY_ID_FIELD))
        .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
        .build()
}

pub fn inventory() -> SheetSchema {
    SheetSchema::builder(sheet_names::INVENTORY, tables::INVENTORY)
        .columns(vec![
            ColumnSpec::text("name")
                .required()
                .rule(FieldRule::InventoryName),
            property_column(),
            ColumnSpec::text("building").references(scoped_reference(
                "building",
                tables::BUILDING,
                "buildingId",
            )),
            ColumnSpec::text("description"),
            ColumnSpec::text("type").required().one_of(&INVENTORY_TYPES),
            ColumnSpec::text("state").one_of(&INVENTORY_STATES),
            ColumnSpec::text("inventoryGroup")
                .required()
                .references(scoped_reference(
                    "inventoryGroup",
                    tables::INVENTORY_GROUP,
                    "inventoryGroupId",
                )),
            ColumnSpec::text("layout").references(scoped_reference("layout", tables::LAYOUT, "layoutId")),
            ColumnSpec::number("multipleItemTotal").rule(FieldRule::PositiveInteger),
            // 父级房源在同一物业内按名称解析；找不到时只记日志
            ColumnSpec::text("parentInventory").references(
                scoped_reference("parentInventory", tables::INVENTORY, "parentInventoryId").optional(),
            ),
            ColumnSpec::number("floor").rule(FieldRule::Integer),
            amenities_column(),
            ColumnSpec::text("externalId"),
            ColumnSpec::text("address"),
            ColumnSpec::text("rmsExternalId"),
            ColumnSpec::boolean("inactiveFlag").db_field("inactive"),
        ])
        .natural_key(&["name", PROPERTY_ID_FIELD])
        .export_order(&[PROPERTY_ID_FIELD, "name"])
        .timezone(TimezoneSource::ViaProperty(PROPERTY_ID_FIELD))
        .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
        .build()
}
