// ==========================================
// 数据泵 - 物业设置校验
// ==========================================
// 规则: 开启自助改约时必须提供改约链接
// ==========================================

use crate::domain::entity::{text_of, Entity};
use crate::domain::outcome::FieldError;
use crate::importer::custom_validator::CustomCheck;
use serde_json::Value;

pub const ENABLE_SELF_SERVICE_EDIT_FIELD: &str = "appointment\nenableSelfServiceEdit";
pub const EDIT_URL_FIELD: &str = "appointment\neditUrl";
pub const EDIT_URL_REQUIRED: &str =
    "Edit appointment url is mandatory if enableSelfServiceEdit is set to TRUE";

pub struct PropertySettingRules;

impl CustomCheck for PropertySettingRules {
    fn check(&mut self, entity: &Entity, _index: usize, _all_rows: &[Entity]) -> Vec<FieldError> {
        let enabled = matches!(entity.get(ENABLE_SELF_SERVICE_EDIT_FIELD), Some(Value::Bool(true)));
        if enabled && text_of(entity, EDIT_URL_FIELD).is_none() {
            return vec![FieldError::custom(EDIT_URL_FIELD, EDIT_URL_REQUIRED)];
        }
        Vec::new()
    }
}
