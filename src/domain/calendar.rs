// ==========================================
// 数据泵 - 日期与时区工具
// ==========================================
// 职责: 工作簿日期格式（M/D/YYYY）解析/格式化、物业时区换算
// 存储约定: 日期以物业本地零点换算成 UTC 后按 RFC3339 保存
// ==========================================

use chrono::{DateTime, Datelike, LocalResult, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// 工作簿日期格式（导出使用，补零）
pub const SHEET_DATE_FORMAT: &str = "%m/%d/%Y";

/// 解析工作簿日期
///
/// 接受 `M/D/YYYY` 与 `MM/DD/YYYY`；年份必须四位。
pub fn parse_sheet_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let (_, year) = value.rsplit_once('/')?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, SHEET_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, "%-m/%-d/%Y"))
        .ok()
}

pub fn format_sheet_date(date: NaiveDate) -> String {
    date.format(SHEET_DATE_FORMAT).to_string()
}

/// 解析 IANA 时区名称（如 `America/Los_Angeles`）
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// 时区内某日零点对应的 UTC 时刻
///
/// 夏令时跳变导致零点不存在时，取当日最早的有效时刻。
pub fn local_midnight_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = midnight + chrono::Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
        }
    }
}

/// UTC 时刻在时区内的日历日
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// 把保存的 RFC3339 时间戳还原为时区内的日历日
pub fn stored_timestamp_to_local_date(value: &str, tz: Tz) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| local_date(dt.with_timezone(&Utc), tz))
}

/// 在时区内从 (month, year) 回退一个月
///
/// # 返回
/// - Some((month, year)): 上一个月
/// - None: 月份非法
pub fn previous_month(month: u32, year: i32, tz: Tz) -> Option<(u32, i32)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let local = local_midnight_utc(first, tz).with_timezone(&tz);
    let prev = local.checked_sub_months(Months::new(1))?;
    Some((prev.month(), prev.year()))
}
