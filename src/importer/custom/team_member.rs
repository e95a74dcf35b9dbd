// ==========================================
// 数据泵 - 团队成员校验
// ==========================================
// 规则: 同一批次内 (team, userUniqueId) 重复出现时，所有重复行都无效
// ==========================================

use crate::domain::entity::{text_of, Entity};
use crate::domain::outcome::FieldError;
use crate::importer::custom_validator::CustomCheck;

pub const DUPLICATE_USER_IN_TEAM: &str = "DUPLICATE_USER_IN_TEAM";

const TEAM_FIELD: &str = "team";
const USER_FIELD: &str = "userUniqueId";

fn member_key(entity: &Entity) -> Option<(String, String)> {
    Some((
        text_of(entity, TEAM_FIELD)?.to_lowercase(),
        text_of(entity, USER_FIELD)?.to_lowercase(),
    ))
}

pub struct UniqueTeamMember;

impl CustomCheck for UniqueTeamMember {
    fn check(&mut self, entity: &Entity, _index: usize, all_rows: &[Entity]) -> Vec<FieldError> {
        let key = match member_key(entity) {
            Some(key) => key,
            None => return Vec::new(),
        };
        let occurrences = all_rows
            .iter()
            .filter(|row| member_key(row).as_ref() == Some(&key))
            .count();
        if occurrences > 1 {
            vec![FieldError::custom(TEAM_FIELD, DUPLICATE_USER_IN_TEAM)]
        } else {
            Vec::new()
        }
    }
}
