// ==========================================
// 数据泵 - 自定义校验钩子
// ==========================================
// 职责: 跨行/业务规则的统一接口与工厂
// - 每批次按 schema.custom 构建一次
// - 可读全部兄弟行、可跨行保存分组状态
// - 批次级查找数据（物业时区、当前时刻）预先加载
// 红线: 仅在字段校验与引用解析都通过后调用
// ==========================================

use crate::domain::entity::Entity;
use crate::domain::outcome::FieldError;
use crate::importer::custom::{
    CloseScheduleContinuity, DistinctTemplateIds, FeeTypeRules, PropertySettingRules,
    UniqueTeamMember,
};
use crate::repository::PropertyTimezones;
use crate::schema::CustomCheckKind;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// 批次级查找数据
#[derive(Debug, Clone)]
pub struct BatchLookups {
    pub property_timezones: PropertyTimezones,
    pub default_timezone: Tz,
    pub now: DateTime<Utc>,
}

// ==========================================
// CustomCheck Trait
// ==========================================
pub trait CustomCheck: Send {
    /// 校验一行
    ///
    /// # 参数
    /// - entity: 当前行（按表头，已注入引用 id）
    /// - index: 当前行在批次中的下标
    /// - all_rows: 批次内全部行（同样形态）
    fn check(&mut self, entity: &Entity, index: usize, all_rows: &[Entity]) -> Vec<FieldError>;
}

/// 按种类构建校验器
pub fn build_custom_check(kind: CustomCheckKind, lookups: &BatchLookups) -> Box<dyn CustomCheck> {
    match kind {
        CustomCheckKind::CloseScheduleContinuity => {
            Box::new(CloseScheduleContinuity::new(lookups.clone()))
        }
        CustomCheckKind::DistinctTemplateIds => Box::new(DistinctTemplateIds),
        CustomCheckKind::UniqueTeamMember => Box::new(UniqueTeamMember),
        CustomCheckKind::PropertySettingRules => Box::new(PropertySettingRules),
        CustomCheckKind::FeeTypeRules => Box::new(FeeTypeRules),
    }
}
