// ==========================================
// 数据泵 - 团队与人员工作表
// ==========================================
// Employees / Voice Messages / Teams / Team Members /
// Team Targets / Team Member Targets / Sources
// ==========================================

use crate::schema::constants::{sheet_names, tables};
use crate::schema::types::{
    ColumnSpec, CustomCheckKind, FieldRule, PrerequisiteSpec, PropertyScope, SheetSchema,
    TimezoneSource,
};

pub const TEAM_MODULES: [&str; 5] = [
    "leasing",
    "residentServices",
    "callCenter",
    "marketing",
    "security",
];

/// 成员角色（主角色 + 职能角色）
pub const MEMBER_ROLES: [&str; 8] = ["LA", "LM", "LD", "LWA", "LCA", "LSM", "LAA", "LCR"];

pub fn employees() -> SheetSchema {
    SheetSchema::builder(sheet_names::EMPLOYEES, tables::USERS)
        .columns(vec![
            ColumnSpec::text("userUniqueId").required(),
            ColumnSpec::text("registrationEmail")
                .required()
                .rule(FieldRule::Mail),
            ColumnSpec::text("fullName").required(),
            ColumnSpec::text("preferredName"),
            ColumnSpec::text("employmentType"),
            ColumnSpec::text("businessTitle"),
            ColumnSpec::text("calendarAccount").rule(FieldRule::Mail),
        ])
        .natural_key(&["userUniqueId"])
        .build()
}

pub fn voice_messages() -> SheetSchema {
    SheetSchema::builder(sheet_names::VOICE_MESSAGES, tables::VOICE_MESSAGE)
        .columns(vec![
            ColumnSpec::text("name").required(),
            ColumnSpec::text("afterHours"),
            ColumnSpec::text("unavailableBot"),
            ColumnSpec::text("recordingNotice"),
        ])
        .natural_key(&["name"])
        .build()
}

/// 语音消息引用：未配置时回落到默认消息
fn voice_message_column() -> ColumnSpec {
    ColumnSpec::text("voiceMessage").references(
        PrerequisiteSpec::new(
            "voiceMessage",
            tables::VOICE_MESSAGE,
            "name",
            "voiceMessageId",
        )
        .optional(),
    )
}

pub fn teams() -> SheetSchema {
    SheetSchema::builder(sheet_names::TEAMS, tables::TEAM)
        .columns(vec![
            ColumnSpec::text("name").required(),
            ColumnSpec::text("displayName").required(),
            ColumnSpec::text("module").required().one_of(&TEAM_MODULES),
            ColumnSpec::text("description"),
            ColumnSpec::array("properties").references(
                PrerequisiteSpec::new("properties", tables::PROPERTY, "name", "propertyIds").multi(),
            ),
            ColumnSpec::text("timeZone")
                .required()
                .rule(FieldRule::TimeZone)
                .db_field("timezone"),
            ColumnSpec::boolean("inactiveFlag").db_field("inactive"),
            ColumnSpec::text("associatedTeamNames"),
            ColumnSpec::text("calendarAccount").rule(FieldRule::Mail),
            voice_message_column(),
        ])
        .natural_key(&["name"])
        .timezone(TimezoneSource::OwnField("timezone"))
        .property_scope(PropertyScope::IdList("propertyIds"))
        .build()
}

pub fn team_members() -> SheetSchema {
    SheetSchema::builder(sheet_names::TEAM_MEMBERS, tables::TEAM_MEMBER)
        .columns(vec![
            ColumnSpec::text("team")
                .required()
                .references(PrerequisiteSpec::new("team", tables::TEAM, "name", "teamId")),
            ColumnSpec::text("userUniqueId")
                .required()
                .references(PrerequisiteSpec::new(
                    "userUniqueId",
                    tables::USERS,
                    "userUniqueId",
                    "userId",
                )),
            ColumnSpec::array("roles").required().one_of(&MEMBER_ROLES),
            ColumnSpec::array("laaAccessLevels"),
            ColumnSpec::boolean("inactiveFlag").db_field("inactive"),
            ColumnSpec::text("directEmailIdentifier"),
            ColumnSpec::text("outsideDedicatedEmails").rule(FieldRule::MailArray),
            ColumnSpec::text("directPhoneIdentifier").rule(FieldRule::PhoneNumber),
            voice_message_column(),
            ColumnSpec::text("externalId"),
        ])
        .natural_key(&["teamId", "userId"])
        .custom(CustomCheckKind::UniqueTeamMember)
        .build()
}

pub fn team_targets() -> SheetSchema {
    let mut columns = vec![ColumnSpec::text("name")
        .required()
        .references(PrerequisiteSpec::new("name", tables::TEAM, "name", "teamId"))];
    columns.extend(month_year_columns());
    columns.extend(vec![
        ColumnSpec::number("salesTarget").rule(FieldRule::PositiveInteger),
        ColumnSpec::number("salesCycleDays").rule(FieldRule::PositiveInteger),
    ]);

    SheetSchema::builder(sheet_names::TEAM_TARGETS, tables::TEAM_SALES_TARGET)
        .columns(columns)
        .natural_key(&["teamId", "month", "year"])
        .export_order(&["teamId", "year", "month"])
        .build()
}

/// 月份与年份列（目标类工作表共用）
fn month_year_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::number("month")
            .required()
            .rule(FieldRule::PositiveInteger)
            .rule(FieldRule::MinValue(1.0))
            .rule(FieldRule::MaxValue(12.0)),
        ColumnSpec::number("year")
            .required()
            .rule(FieldRule::PositiveInteger),
    ]
}

/// 成员月度目标：按团队 + 注册邮箱定位成员
pub fn team_member_targets() -> SheetSchema {
    let mut columns = vec![
        ColumnSpec::text("team")
            .required()
            .references(PrerequisiteSpec::new("team", tables::TEAM, "name", "teamId")),
        ColumnSpec::text("registrationEmail")
            .required()
            .rule(FieldRule::Mail)
            .references(PrerequisiteSpec::new(
                "registrationEmail",
                tables::USERS,
                "registrationEmail",
                "userId",
            )),
    ];
    columns.extend(month_year_columns());
    columns.push(ColumnSpec::number("salesTarget").rule(FieldRule::PositiveInteger));
    columns.extend(
        [
            "contactsToSalesConv",
            "leadsToSalesConv",
            "prospectsToSalesConv",
            "applicantsToSalesConv",
            "leasesToSalesConv",
        ]
        .into_iter()
        .map(|header| ColumnSpec::number(header).rule(FieldRule::Percentage)),
    );

    SheetSchema::builder(sheet_names::TEAM_MEMBER_TARGETS, tables::TEAM_MEMBER_SALES_TARGET)
        .columns(columns)
        .natural_key(&["teamId", "userId", "month", "year"])
        .export_order(&["teamId", "userId", "year", "month"])
        .build()
}

pub fn sources() -> SheetSchema {
    SheetSchema::builder(sheet_names::SOURCES, tables::SOURCE)
        .columns(vec![
            ColumnSpec::text("name").required(),
            ColumnSpec::text("displayName").required(),
            ColumnSpec::text("description"),
            ColumnSpec::text("type"),
        ])
        .natural_key(&["name"])
        .build()
}
