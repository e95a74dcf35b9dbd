// ==========================================
// 数据泵 - 物业相关工作表
// ==========================================
// Business Entities / Property Groups / Party Cohorts /
// Properties / Property Close Schedule
// ==========================================

use crate::schema::constants::{sheet_names, tables, PROPERTY_ID_FIELD, PROPERTY_TIMEZONE_FIELD};
use crate::schema::types::{
    ColumnSpec, CustomCheckKind, EntityShape, FieldRule, PrerequisiteSpec, PropertyScope, RowRule,
    SheetSchema, TimezoneSource,
};

fn address_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::text("addressLine1"),
        ColumnSpec::text("addressLine2"),
        ColumnSpec::text("city"),
        ColumnSpec::text("state"),
        ColumnSpec::text("postalCode").rule(FieldRule::PostalCode),
    ]
}

pub fn business_entities() -> SheetSchema {
    let mut columns = vec![
        ColumnSpec::text("name").required(),
        ColumnSpec::text("type").required().one_of(&["owner", "operator"]),
        ColumnSpec::text("expertise"),
        ColumnSpec::text("description"),
        ColumnSpec::text("website").rule(FieldRule::Url),
    ];
    columns.extend(address_columns());
    columns.extend(vec![
        ColumnSpec::text("contactName"),
        ColumnSpec::text("contactEmail").rule(FieldRule::Mail),
        ColumnSpec::text("contactPhone").rule(FieldRule::PhoneNumber),
    ]);

    SheetSchema::builder(sheet_names::BUSINESS_ENTITIES, tables::BUSINESS_ENTITY)
        .columns(columns)
        .natural_key(&["name"])
        .shape(EntityShape::Embedded {
            field: "contactInfo",
            members: vec![
                ("contactName", "name"),
                ("contactEmail", "email"),
                ("contactPhone", "phone"),
            ],
        })
        .build()
}

pub fn property_groups() -> SheetSchema {
    SheetSchema::builder(sheet_names::PROPERTY_GROUPS, tables::PROPERTY_GROUP)
        .columns(vec![
            ColumnSpec::text("name").required(),
            ColumnSpec::text("displayName").required(),
            ColumnSpec::text("description"),
            ColumnSpec::text("owner").references(PrerequisiteSpec::new(
                "owner",
                tables::BUSINESS_ENTITY,
                "name",
                "ownerId",
            )),
            ColumnSpec::text("operator").references(PrerequisiteSpec::new(
                "operator",
                tables::BUSINESS_ENTITY,
                "name",
                "operatorId",
            )),
            ColumnSpec::text("parentGroup"),
        ])
        .natural_key(&["name"])
        .build()
}

pub fn party_cohorts() -> SheetSchema {
    SheetSchema::builder(sheet_names::PARTY_COHORTS, tables::PARTY_COHORT)
        .columns(vec![
            ColumnSpec::text("name").required(),
            ColumnSpec::text("description"),
        ])
        .natural_key(&["name"])
        .build()
}

pub fn properties() -> SheetSchema {
    let mut columns = vec![
        ColumnSpec::text("name")
            .required()
            .rule(FieldRule::Alphanumeric { max_len: 64 }),
        ColumnSpec::text("displayName").required(),
        ColumnSpec::text("propertyLegalName"),
        ColumnSpec::text("owner").references(PrerequisiteSpec::new(
            "owner",
            tables::BUSINESS_ENTITY,
            "name",
            "ownerId",
        )),
        ColumnSpec::text("operator").references(PrerequisiteSpec::new(
            "operator",
            tables::BUSINESS_ENTITY,
            "name",
            "operatorId",
        )),
        ColumnSpec::text("propertyGroup").references(PrerequisiteSpec::new(
            "propertyGroup",
            tables::PROPERTY_GROUP,
            "name",
            "propertyGroupId",
        )),
        ColumnSpec::text("partyCohort").references(PrerequisiteSpec::new(
            "partyCohort",
            tables::PARTY_COHORT,
            "name",
            "partyCohortId",
        )),
    ];
    columns.extend(address_columns());
    columns.extend(vec![
        ColumnSpec::text("timeZone")
            .required()
            .rule(FieldRule::TimeZone)
            .db_field(PROPERTY_TIMEZONE_FIELD),
        ColumnSpec::date("startDate"),
        ColumnSpec::date("endDate"),
        ColumnSpec::number("APN").db_field("apn"),
        ColumnSpec::number("MSANumber").db_field("msaNumber"),
        ColumnSpec::text("MSAName").db_field("msaName"),
        ColumnSpec::text("description"),
        ColumnSpec::text("website").rule(FieldRule::Url),
        ColumnSpec::text("displayPhone").rule(FieldRule::PhoneNumber),
        ColumnSpec::text("externalId"),
        ColumnSpec::boolean("inactiveFlag").db_field("inactive"),
        ColumnSpec::array("daughterProperties"),
    ]);

    SheetSchema::builder(sheet_names::PROPERTIES, tables::PROPERTY)
        .columns(columns)
        .row_rule(RowRule::AtLeastOneNotEmpty(vec![
            "owner",
            "operator",
            "propertyGroup",
        ]))
        .natural_key(&["name"])
        .timezone(TimezoneSource::OwnField(PROPERTY_TIMEZONE_FIELD))
        .property_scope(PropertyScope::SelfId)
        .build()
}

pub fn property_close_schedule() -> SheetSchema {
    SheetSchema::builder(
        sheet_names::PROPERTY_CLOSE_SCHEDULE,
        tables::PROPERTY_CLOSE_SCHEDULE,
    )
    .columns(vec![
        ColumnSpec::text("propertyName")
            .required()
            .references(PrerequisiteSpec::new(
                "propertyName",
                tables::PROPERTY,
                "name",
                PROPERTY_ID_FIELD,
            )),
        ColumnSpec::number("month")
            .required()
            .rule(FieldRule::PositiveInteger)
            .rule(FieldRule::MinValue(1.0))
            .rule(FieldRule::MaxValue(12.0)),
        ColumnSpec::number("year")
            .required()
            .rule(FieldRule::PositiveInteger),
        ColumnSpec::date("rollForwardDate").required(),
    ])
    .natural_key(&[PROPERTY_ID_FIELD, "month", "year"])
    .export_order(&[PROPERTY_ID_FIELD, "year", "month"])
    .timezone(TimezoneSource::ViaProperty(PROPERTY_ID_FIELD))
    .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
    .custom(CustomCheckKind::CloseScheduleContinuity)
    .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_entity_contact_info_is_custom() {
        let schema = business_entities();
        assert!(schema.custom_keys.contains("contactEmail"));
        let stored: Vec<&str> = schema.stored_fields().iter().map(|f| f.name).collect();
        assert!(stored.contains(&"contactInfo"));
        assert!(!stored.contains(&"contactEmail"));
    }

    #[test]
    fn test_properties_rename_timezone() {
        let schema = properties();
        let column = schema.column("timeZone").unwrap();
        assert_eq!(column.stored_name(), "timezone");
        assert_eq!(schema.header_for_stored("timezone"), Some("timeZone"));
        assert_eq!(schema.header_for_stored("ownerId"), Some("owner"));
    }

    #[test]
    fn test_close_schedule_key_and_order() {
        let schema = property_close_schedule();
        assert_eq!(schema.natural_key(), &["propertyId", "month", "year"]);
        assert_eq!(schema.order_fields(), vec!["propertyId", "year", "month"]);
        assert!(schema.is_order_dependent());
    }
}
