// ==========================================
// 数据泵 - 自定义校验实现
// ==========================================

pub mod close_schedule;
pub mod fee;
pub mod lease_template;
pub mod property_setting;
pub mod team_member;

pub use close_schedule::CloseScheduleContinuity;
pub use fee::FeeTypeRules;
pub use lease_template::DistinctTemplateIds;
pub use property_setting::PropertySettingRules;
pub use team_member::UniqueTeamMember;
