// ==========================================
// 数据泵 - 工作表与表名常量
// ==========================================

/// 工作簿中的工作表名称
pub mod sheet_names {
    pub const GLOBAL_SETTINGS: &str = "Global Settings";
    pub const BUSINESS_ENTITIES: &str = "Business Entities";
    pub const PROPERTY_GROUPS: &str = "Property Groups";
    pub const PARTY_COHORTS: &str = "Party Cohorts";
    pub const PROPERTIES: &str = "Properties";
    pub const PROPERTY_CLOSE_SCHEDULE: &str = "Property Close Schedule";
    pub const PROPERTY_SETTINGS: &str = "Property Settings";
    pub const AMENITIES: &str = "Amenities";
    pub const BUILDINGS: &str = "Buildings";
    pub const LAYOUTS: &str = "Layouts";
    pub const FEES: &str = "Fees";
    pub const INVENTORY_GROUPS: &str = "Inventory Groups";
    pub const INVENTORY: &str = "Inventory";
    pub const CONCESSIONS: &str = "Concessions";
    pub const LEASE_NAMES: &str = "Lease Names";
    pub const LEASE_TERMS: &str = "Lease Terms";
    pub const LEASE_TEMPLATES: &str = "Lease Templates";
    pub const EMPLOYEES: &str = "Employees";
    pub const VOICE_MESSAGES: &str = "Voice Messages";
    pub const TEAMS: &str = "Teams";
    pub const TEAM_MEMBERS: &str = "Team Members";
    pub const TEAM_TARGETS: &str = "Team Targets";
    pub const TEAM_MEMBER_TARGETS: &str = "Team Member Targets";
    pub const SOURCES: &str = "Sources";
}

/// 存储表名
pub mod tables {
    pub const GLOBAL_SETTING: &str = "GlobalSetting";
    pub const BUSINESS_ENTITY: &str = "BusinessEntity";
    pub const PROPERTY_GROUP: &str = "PropertyGroup";
    pub const PARTY_COHORT: &str = "PartyCohort";
    pub const PROPERTY: &str = "Property";
    pub const PROPERTY_CLOSE_SCHEDULE: &str = "PropertyCloseSchedule";
    pub const PROPERTY_SETTING: &str = "PropertySetting";
    pub const AMENITY: &str = "Amenity";
    pub const BUILDING: &str = "Building";
    pub const LAYOUT: &str = "Layout";
    pub const FEE: &str = "Fee";
    pub const INVENTORY_GROUP: &str = "InventoryGroup";
    pub const INVENTORY: &str = "Inventory";
    pub const CONCESSION: &str = "Concession";
    pub const LEASE_NAME: &str = "LeaseName";
    pub const LEASE_TERM: &str = "LeaseTerm";
    pub const LEASE_TEMPLATE: &str = "LeaseTemplate";
    pub const USERS: &str = "Users";
    pub const VOICE_MESSAGE: &str = "VoiceMessage";
    pub const TEAM: &str = "Team";
    pub const TEAM_MEMBER: &str = "TeamMember";
    pub const TEAM_SALES_TARGET: &str = "TeamSalesTarget";
    pub const TEAM_MEMBER_SALES_TARGET: &str = "TeamMemberSalesTarget";
    pub const SOURCE: &str = "Source";
}

/// 物业时区字段（物业表）
pub const PROPERTY_TIMEZONE_FIELD: &str = "timezone";

/// 物业 id 注入字段
pub const PROPERTY_ID_FIELD: &str = "propertyId";

/// 必须成对导入的工作表
pub const PAIRED_SHEETS: (&str, &str) = (sheet_names::EMPLOYEES, sheet_names::TEAM_MEMBERS);
