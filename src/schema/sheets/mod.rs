// ==========================================
// 数据泵 - 工作表定义
// ==========================================
// 职责: 每张工作表的列、引用与落库方式
// 顺序: all_sheets() 的顺序即同层内的导入顺序
// ==========================================

pub mod inventory;
pub mod leasing;
pub mod pricing;
pub mod property;
pub mod settings;
pub mod team;

use crate::schema::types::SheetSchema;

/// 全部工作表（按工作簿中的习惯顺序）
pub fn all_sheets() -> Vec<SheetSchema> {
    vec![
        settings::global_settings(),
        property::business_entities(),
        property::property_groups(),
        property::party_cohorts(),
        property::properties(),
        property::property_close_schedule(),
        team::voice_messages(),
        team::teams(),
        inventory::amenities(),
        settings::property_settings(),
        inventory::buildings(),
        leasing::lease_names(),
        leasing::lease_terms(),
        inventory::layouts(),
        pricing::fees(),
        inventory::inventory_groups(),
        inventory::inventory(),
        pricing::concessions(),
        team::employees(),
        team::team_targets(),
        team::team_members(),
        team::team_member_targets(),
        team::sources(),
        leasing::lease_templates(),
    ]
}
