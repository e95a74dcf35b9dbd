// ==========================================
// 数据泵 - 租约模板校验
// ==========================================
// 规则: sandboxTemplateId 与 prodTemplateId 不得相同（两者都有值时）
// ==========================================

use crate::domain::entity::{text_of, Entity};
use crate::domain::outcome::FieldError;
use crate::importer::custom_validator::CustomCheck;

pub const SANDBOX_TEMPLATE_FIELD: &str = "sandboxTemplateId";
pub const PROD_TEMPLATE_FIELD: &str = "prodTemplateId";
pub const SAME_TEMPLATE_ID: &str = "sandboxTemplateId and prodTemplateId cannot have the same value";

pub struct DistinctTemplateIds;

impl CustomCheck for DistinctTemplateIds {
    fn check(&mut self, entity: &Entity, _index: usize, _all_rows: &[Entity]) -> Vec<FieldError> {
        match (
            text_of(entity, SANDBOX_TEMPLATE_FIELD),
            text_of(entity, PROD_TEMPLATE_FIELD),
        ) {
            (Some(sandbox), Some(prod)) if sandbox == prod => {
                vec![FieldError::custom(SANDBOX_TEMPLATE_FIELD, SAME_TEMPLATE_ID)]
            }
            _ => Vec::new(),
        }
    }
}
