// ==========================================
// 数据泵 - 物业关账计划校验
// ==========================================
// 规则（按物业分组，组内按导入顺序）:
// 1. 当前 (month, year) 回退一个月必须等于组内上一行
// 2. rollForwardDate 不得早于组内上一行
// 3. 一行失败后，组内后续行全部标记失败（粘性）
// 4. 每行独立: rollForwardDate 必须晚于物业时区的今天
// 约束: 输入须已按物业分组排序，本校验不重排
// ==========================================

use crate::domain::calendar::{local_date, parse_sheet_date, previous_month};
use crate::domain::entity::{number_of, text_of, Entity};
use crate::domain::outcome::FieldError;
use crate::importer::custom_validator::{BatchLookups, CustomCheck};
use crate::schema::constants::PROPERTY_ID_FIELD;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::HashSet;
use tracing::debug;

pub const INVALID_MONTH_SEQUENCE: &str = "INVALID_MONTH_SEQUENCE";
pub const ROLL_FORWARD_DATE_OUT_OF_ORDER: &str = "ROLL_FORWARD_DATE_OUT_OF_ORDER";
pub const PREVIOUS_ROW_IN_GROUP_INVALID: &str = "PREVIOUS_ROW_IN_GROUP_INVALID";
pub const ROLL_FORWARD_DATE_NOT_IN_FUTURE: &str = "ROLL_FORWARD_DATE_NOT_IN_FUTURE";

const GROUP_FIELD: &str = "propertyName";
const MONTH_FIELD: &str = "month";
const YEAR_FIELD: &str = "year";
const ROLL_FORWARD_FIELD: &str = "rollForwardDate";

/// 组内一行的可比较部分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduleEntry {
    month: u32,
    year: i32,
    roll_forward: NaiveDate,
}

fn group_key(entity: &Entity) -> Option<String> {
    text_of(entity, GROUP_FIELD).map(|name| name.to_lowercase())
}

fn schedule_entry(entity: &Entity) -> Option<ScheduleEntry> {
    let month = number_of(entity, MONTH_FIELD)?;
    let year = number_of(entity, YEAR_FIELD)?;
    if month.fract() != 0.0 || year.fract() != 0.0 || !(1.0..=12.0).contains(&month) {
        return None;
    }
    Some(ScheduleEntry {
        month: month as u32,
        year: year as i32,
        roll_forward: parse_sheet_date(&text_of(entity, ROLL_FORWARD_FIELD)?)?,
    })
}

pub struct CloseScheduleContinuity {
    lookups: BatchLookups,
    /// 已失败的分组（小写物业名）
    failed_groups: HashSet<String>,
}

impl CloseScheduleContinuity {
    pub fn new(lookups: BatchLookups) -> Self {
        Self {
            lookups,
            failed_groups: HashSet::new(),
        }
    }

    fn timezone(&self, entity: &Entity) -> Tz {
        text_of(entity, PROPERTY_ID_FIELD)
            .and_then(|id| self.lookups.property_timezones.get(&id))
            .unwrap_or(self.lookups.default_timezone)
    }

    /// 组内上一条可比较的行
    fn previous_entry(group: &str, index: usize, all_rows: &[Entity]) -> Option<ScheduleEntry> {
        all_rows
            .iter()
            .take(index.min(all_rows.len()))
            .rev()
            .filter(|row| group_key(row).as_deref() == Some(group))
            .find_map(schedule_entry)
    }
}

impl CustomCheck for CloseScheduleContinuity {
    fn check(&mut self, entity: &Entity, index: usize, all_rows: &[Entity]) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let (group, current) = match (group_key(entity), schedule_entry(entity)) {
            (Some(group), Some(current)) => (group, current),
            _ => return errors,
        };
        let tz = self.timezone(entity);

        let today = local_date(self.lookups.now, tz);
        if current.roll_forward <= today {
            errors.push(FieldError::custom(ROLL_FORWARD_FIELD, ROLL_FORWARD_DATE_NOT_IN_FUTURE));
        }

        if self.failed_groups.contains(&group) {
            errors.push(FieldError::custom(GROUP_FIELD, PREVIOUS_ROW_IN_GROUP_INVALID));
            return errors;
        }

        let previous = match Self::previous_entry(&group, index, all_rows) {
            Some(previous) => previous,
            None => return errors,
        };

        let mut group_failed = false;
        if previous_month(current.month, current.year, tz) != Some((previous.month, previous.year)) {
            errors.push(FieldError::custom(MONTH_FIELD, INVALID_MONTH_SEQUENCE));
            group_failed = true;
        }
        if current.roll_forward < previous.roll_forward {
            errors.push(FieldError::custom(ROLL_FORWARD_FIELD, ROLL_FORWARD_DATE_OUT_OF_ORDER));
            group_failed = true;
        }

        if group_failed {
            debug!(group = %group, row = index, "关账计划分组校验失败，后续行将标记无效");
            self.failed_groups.insert(group);
        }
        errors
    }
}
