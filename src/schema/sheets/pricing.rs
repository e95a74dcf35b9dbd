// ==========================================
// 数据泵 - 费用与优惠工作表
// ==========================================
// Fees / Concessions
// 费用之间的关联（附加费用、相关费用）指向同一张表
// ==========================================

use crate::schema::constants::{sheet_names, tables, PROPERTY_ID_FIELD};
use crate::schema::sheets::leasing::LEASE_STATES;
use crate::schema::types::{
    ColumnSpec, CustomCheckKind, FieldRule, PrerequisiteSpec, PropertyScope, RowRule, SheetSchema,
    TimezoneSource,
};

pub const FEE_TYPES: [&str; 8] = [
    "application",
    "waiverApplication",
    "deposit",
    "inventoryGroup",
    "leaseBreak",
    "penalty",
    "service",
    "holdDeposit",
];

pub const QUOTE_SECTIONS: [&str; 10] = [
    "application",
    "inventory",
    "parking",
    "service",
    "deposit",
    "appliance",
    "pet",
    "penalty",
    "storage",
    "utility",
];

pub const SERVICE_PERIODS: [&str; 5] = ["oneTime", "month", "week", "day", "hour"];
pub const FLOOR_CEILING: [&str; 2] = ["floor", "ceiling"];
pub const NON_RECURRING_APPLIED_AT: [&str; 3] = ["first", "last", "firstFull"];
pub const CONCESSION_LEASE_STATES: [&str; 3] = ["new", "renewal", "month-to-month"];

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

/// 同一物业内的费用引用（多值）
fn fee_list(header: &'static str, injected_id_field: &'static str) -> PrerequisiteSpec {
    PrerequisiteSpec::new(header, tables::FEE, "name", injected_id_field)
        .multi()
        .scoped(PROPERTY_ID_FIELD, PROPERTY_ID_FIELD)
}

fn external_account_columns() -> Vec<ColumnSpec> {
    [
        "externalChargeCode",
        "externalChargeAccount",
        "externalChargeAccrualAccount",
        "externalChargeNotes",
        "externalChargeRef",
        "externalReceiptAccount",
        "externalReceiptAccrualAccount",
        "externalReceiptOffset",
        "externalReceiptNotes",
        "externalReceiptRef",
        "externalWaiverAccount",
        "externalWaiverAccrualAccount",
        "externalWaiverOffset",
        "externalWaiverNotes",
        "externalWaiverRef",
    ]
    .into_iter()
    .map(ColumnSpec::text)
    .collect()
}

pub fn fees() -> SheetSchema {
    let mut columns = vec![
        ColumnSpec::text("name").required(),
        property_column(),
        ColumnSpec::text("displayName").required(),
        ColumnSpec::text("description"),
        ColumnSpec::text("feeType").required().one_of(&FEE_TYPES),
        ColumnSpec::boolean("renewalLetterDisplayFlag").db_field("renewalLetterDisplay"),
        ColumnSpec::text("quoteSectionName").one_of(&QUOTE_SECTIONS),
        ColumnSpec::number("maxQuantityInQuote").rule(FieldRule::PositiveInteger),
        ColumnSpec::array("additionalFees").references(fee_list("additionalFees", "additionalFeeIds")),
        ColumnSpec::array("relatedFees").references(fee_list("relatedFees", "relatedFeeIds")),
        ColumnSpec::text("servicePeriod").one_of(&SERVICE_PERIODS),
        ColumnSpec::boolean("variableAdjustmentFlag").db_field("variableAdjustment"),
        ColumnSpec::boolean("estimatedFlag").db_field("estimated"),
        ColumnSpec::number("relativePrice").rule(FieldRule::PositiveDecimal),
        ColumnSpec::number("absolutePrice").rule(FieldRule::PositiveDecimal),
        ColumnSpec::number("relativeDefaultPrice").rule(FieldRule::PositiveDecimal),
        ColumnSpec::number("absoluteDefaultPrice").rule(FieldRule::PositiveDecimal),
        ColumnSpec::text("priceFloorCeiling").one_of(&FLOOR_CEILING),
        ColumnSpec::boolean("depositInterestFlag").db_field("depositInterest"),
        ColumnSpec::boolean("quotePaymentScheduleFlag").db_field("quotePaymentSchedule"),
        ColumnSpec::text("leaseState").one_of(&LEASE_STATES),
    ];
    columns.extend(external_account_columns());
    columns.push(ColumnSpec::text("marketingQuestionName"));

    SheetSchema::builder(sheet_names::FEES, tables::FEE)
        .columns(columns)
        .natural_key(&["name", PROPERTY_ID_FIELD])
        .export_order(&[PROPERTY_ID_FIELD, "name"])
        .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
        .custom(CustomCheckKind::FeeTypeRules)
        .build()
}

pub fn concessions() -> SheetSchema {
    SheetSchema::builder(sheet_names::CONCESSIONS, tables::CONCESSION)
        .columns(vec![
            ColumnSpec::text("name").required(),
            property_column(),
            ColumnSpec::text("displayName"),
            ColumnSpec::array("appliedToFees")
                .required()
                .references(fee_list("appliedToFees", "appliedToFeeIds")),
            ColumnSpec::number("relativeAdjustment"),
            ColumnSpec::number("absoluteAdjustment"),
            ColumnSpec::number("relativeDefaultAdjustment"),
            ColumnSpec::number("absoluteDefaultAdjustment"),
            ColumnSpec::text("adjustmentFloorCeiling").one_of(&FLOOR_CEILING),
            ColumnSpec::boolean("variableAdjustmentFlag").db_field("variableAdjustment"),
            ColumnSpec::boolean("optionalFlag").db_field("optional"),
            ColumnSpec::boolean("excludeFromRentFlag").db_field("excludeFromRent"),
            ColumnSpec::boolean("hideInSelfServiceFlag").db_field("hideInSelfService"),
            ColumnSpec::boolean("recurringFlag").db_field("recurring"),
            ColumnSpec::number("recurringCount")
                .rule(FieldRule::Integer)
                .rule(FieldRule::MinValue(1.0)),
            ColumnSpec::text("nonRecurringAppliedAt").one_of(&NON_RECURRING_APPLIED_AT),
            ColumnSpec::text("leaseState").one_of(&CONCESSION_LEASE_STATES),
            ColumnSpec::array("leaseNames"),
            ColumnSpec::text("minLeaseLength").rule(FieldRule::NumericArray),
            ColumnSpec::text("maxLeaseLength").rule(FieldRule::NumericArray),
            ColumnSpec::array("layouts"),
            ColumnSpec::text("buildings"),
            ColumnSpec::array("amenities"),
            ColumnSpec::date("startDate"),
            ColumnSpec::date("endDate"),
            ColumnSpec::number("account").rule(FieldRule::PositiveInteger),
            ColumnSpec::number("subAccount").rule(FieldRule::Integer),
            ColumnSpec::boolean("taxableFlag").db_field("taxable"),
            ColumnSpec::text("externalChargeCode"),
            ColumnSpec::boolean("bakedIntoAppliedFeeFlag").db_field("bakedIntoAppliedFee"),
        ])
        .row_rule(RowRule::AtLeastOneNotEmpty(vec![
            "relativeAdjustment",
            "absoluteAdjustment",
        ]))
        .natural_key(&["name", PROPERTY_ID_FIELD])
        .export_order(&[PROPERTY_ID_FIELD, "name"])
        .timezone(TimezoneSource::ViaProperty(PROPERTY_ID_FIELD))
        .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
        .build()
}
