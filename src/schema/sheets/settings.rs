// ==========================================
// 数据泵 - 设置类工作表
// ==========================================
// Global Settings / Property Settings
// 表头形如 "section\nfield"，折叠为 settings 对象
// ==========================================

use crate::schema::constants::{sheet_names, tables, PROPERTY_ID_FIELD};
use crate::schema::types::{
    ColumnSpec, CustomCheckKind, EntityShape, FieldRule, PrerequisiteSpec, PropertyScope,
    SheetSchema, TimezoneSource,
};

/// 设置对象所在字段
pub const SETTINGS_FIELD: &str = "settings";

/// 团队日程时段（分钟）
pub const TEAM_SLOT_DURATIONS: [&str; 4] = ["15", "30", "45", "60"];

pub fn global_settings() -> SheetSchema {
    SheetSchema::builder(sheet_names::GLOBAL_SETTINGS, tables::GLOBAL_SETTING)
        .columns(vec![
            ColumnSpec::text("communications\ndefaultEmailSignature"),
            ColumnSpec::text("communications\ncontactUsLink").rule(FieldRule::Url),
            ColumnSpec::text("communications\nfooterNotice"),
            ColumnSpec::text("communications\nfooterCopyright"),
            ColumnSpec::boolean("preferences\nhidePropertyLifestyles"),
            ColumnSpec::number("screening\noriginatorId").rule(FieldRule::PositiveInteger),
            ColumnSpec::text("screening\nusername"),
            ColumnSpec::boolean("quote\nallowBaseRentAdjustmentFlag"),
            ColumnSpec::text("communicationOverrides\ncustomerEmails").rule(FieldRule::MailArray),
            ColumnSpec::text("communicationOverrides\nemployeeEmails").rule(FieldRule::MailArray),
        ])
        .replace_all()
        .shape(EntityShape::NestedSettings {
            field: SETTINGS_FIELD,
        })
        .build()
}

pub fn property_settings() -> SheetSchema {
    SheetSchema::builder(sheet_names::PROPERTY_SETTINGS, tables::PROPERTY_SETTING)
        .columns(vec![
            ColumnSpec::text("property")
                .required()
                .references(PrerequisiteSpec::new(
                    "property",
                    tables::PROPERTY,
                    "name",
                    PROPERTY_ID_FIELD,
                )),
            ColumnSpec::boolean("appointment\nenableSelfServiceEdit"),
            ColumnSpec::text("appointment\neditUrl").rule(FieldRule::Url),
            ColumnSpec::array("appointment\ntourTypesAvailable"),
            ColumnSpec::number("calendar\nteamSlotDuration").one_of(&TEAM_SLOT_DURATIONS),
            ColumnSpec::array("marketing\ncityAliases"),
            ColumnSpec::array("marketing\ntags"),
            ColumnSpec::number("comms\ndaysToRouteToALPostMoveout").rule(FieldRule::PositiveInteger),
            ColumnSpec::number("residentservices\nmoveoutNoticePeriod").rule(FieldRule::PositiveInteger),
            ColumnSpec::number("renewals\nrenewalCycleStart").rule(FieldRule::PositiveInteger),
            ColumnSpec::boolean("renewals\nskipOriginalGuarantors"),
            ColumnSpec::array("applicationReview\nconditionalApprovalOptions"),
            ColumnSpec::array("lease\nresidentSignatureTypes").one_of(&["digital", "wet"]),
            ColumnSpec::boolean("integration\nimportResidentData"),
        ])
        .natural_key(&[PROPERTY_ID_FIELD])
        .shape(EntityShape::NestedSettings {
            field: SETTINGS_FIELD,
        })
        .timezone(TimezoneSource::ViaProperty(PROPERTY_ID_FIELD))
        .property_scope(PropertyScope::Id(PROPERTY_ID_FIELD))
        .custom(CustomCheckKind::PropertySettingRules)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::StoredKind;

    #[test]
    fn test_property_settings_stored_fields() {
        let schema = property_settings();
        let fields = schema.stored_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "propertyId");
        assert_eq!(fields[0].kind, StoredKind::Id);
        assert_eq!(fields[1].name, SETTINGS_FIELD);
        assert_eq!(fields[1].kind, StoredKind::Json);
    }

    #[test]
    fn test_global_settings_replace_all() {
        let schema = global_settings();
        assert!(schema.natural_key().is_empty());
        assert!(schema.order_fields().is_empty());
    }
}
