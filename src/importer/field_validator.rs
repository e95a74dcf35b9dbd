// ==========================================
// 数据泵 - 字段校验器
// ==========================================
// 职责: 单元格级别的语法规则校验
// - 规则按声明顺序执行，NOT_EMPTY 失败时短路后续规则
// - 除 NOT_EMPTY 外，空值一律通过
// - 同一字段多条规则失败时全部上报
// 红线: 纯函数，无 I/O，校验失败不走 Err
// ==========================================

use crate::domain::calendar::{parse_sheet_date, parse_timezone};
use crate::domain::cell::{CellValue, SheetRow};
use crate::domain::entity::split_tokens;
use crate::domain::outcome::FieldError;
use crate::schema::{FieldRule, RowRule, SheetSchema};
use regex::Regex;
use std::sync::OnceLock;

/// 校验失败消息（稳定 token，供前端本地化）
pub mod tokens {
    pub const FIELD_REQUIRED: &str = "FIELD_REQUIRED";
    pub const INVALID_LENGTH: &str = "INVALID_LENGTH";
    pub const NOT_A_NUMBER: &str = "NOT_A_NUMBER";
    pub const NOT_INTEGER: &str = "NOT_INTEGER";
    pub const INVALID_DECIMAL: &str = "INVALID_DECIMAL";
    pub const NOT_POSITIVE_DECIMAL: &str = "NOT_POSITIVE_DECIMAL";
    pub const NOT_POSITIVE_INTEGER: &str = "NOT_POSITIVE_INTEGER";
    pub const INVALID_MIN_VALUE: &str = "INVALID_MIN_VALUE";
    pub const INVALID_MAX_VALUE: &str = "INVALID_MAX_VALUE";
    pub const NOT_BOOLEAN: &str = "NOT_BOOLEAN";
    pub const INVALID_DATE: &str = "INVALID_DATE";
    pub const INVALID_PERCENTAGE_VALUE: &str = "INVALID_PERCENTAGE_VALUE";
    pub const INVALID_EMAIL: &str = "INVALID_EMAIL";
    pub const INVALID_MAIL_ARRAY: &str = "INVALID_MAIL_ARRAY";
    pub const INVALID_PHONE_NUMBER: &str = "INVALID_PHONE_NUMBER";
    pub const INVALID_POSTAL_CODE: &str = "INVALID_POSTAL_CODE";
    pub const INVALID_URL: &str = "INVALID_URL";
    pub const INVALID_TIME_ZONE: &str = "INVALID_TIME_ZONE";
    pub const INVALID_NUMERIC_ARRAY: &str = "INVALID_NUMERIC_ARRAY";
    pub const INVALID_INVENTORY_NAME: &str = "INVALID_INVENTORY_NAME";
    pub const INVALID_VALUE: &str = "INVALID_VALUE";
    pub const ONE_OF_THIS_FIELDS_REQUIRED: &str = "ONE_OF_THIS_FIELDS_REQUIRED";
}

/// 布尔列可接受的文本（大小写不敏感，空值另行放行）
pub const BOOLEAN_TOKENS: [&str; 5] = ["true", "false", "1", "0", "x"];

/// 内置正则（编译一次）；编译失败时视为不匹配
fn regex_matches(cell: &'static OnceLock<Option<Regex>>, pattern: &str, text: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

fn is_decimal(text: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex_matches(&RE, r"^-?\d+(\.\d+)?$", text)
}

fn is_mail(text: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex_matches(
        &RE,
        r"^[A-Za-z0-9._%+'\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$",
        text.trim(),
    )
}

fn is_phone_number(text: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let compact: String = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    regex_matches(&RE, r"^\+?\d{10,15}$", &compact)
}

fn is_postal_code(text: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex_matches(&RE, r"^\d{5}(-\d{4})?$", text)
}

fn is_url(text: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    regex_matches(&RE, r"(?i)^https?://[^\s/$.?#][^\s]*$", text)
}

fn parse_number(value: &CellValue, text: &str) -> Option<f64> {
    match value {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Number(_) | CellValue::Bool(_) => None,
        _ => text.parse::<f64>().ok().filter(|n| n.is_finite()),
    }
}

/// 单条规则是否通过（调用方保证 text 非空）
fn rule_passes(rule: &FieldRule, value: &CellValue, text: &str) -> bool {
    match rule {
        FieldRule::NotEmpty => true,
        FieldRule::Alphanumeric { max_len } => text.chars().count() <= *max_len,
        FieldRule::Numeric => parse_number(value, text).is_some(),
        FieldRule::Integer => parse_number(value, text).map(|n| n.fract() == 0.0).unwrap_or(false),
        FieldRule::Decimal => is_decimal(text),
        FieldRule::PositiveDecimal => parse_number(value, text).map(|n| n >= 0.0).unwrap_or(false),
        FieldRule::PositiveInteger => parse_number(value, text)
            .map(|n| n.fract() == 0.0 && n >= 0.0)
            .unwrap_or(false),
        // 非数值由 NUMERIC 规则上报
        FieldRule::MinValue(min) => parse_number(value, text).map(|n| n >= *min).unwrap_or(true),
        FieldRule::MaxValue(max) => parse_number(value, text).map(|n| n <= *max).unwrap_or(true),
        FieldRule::Boolean => match value {
            CellValue::Bool(_) => true,
            CellValue::Number(n) => *n == 0.0 || *n == 1.0,
            _ => BOOLEAN_TOKENS.contains(&text.to_lowercase().as_str()),
        },
        FieldRule::Date => parse_sheet_date(text).is_some(),
        FieldRule::Percentage => {
            let raw = text.strip_suffix('%').unwrap_or(text).trim();
            let number = match value {
                CellValue::Number(n) => Some(*n),
                _ => raw.parse::<f64>().ok(),
            };
            number.map(|n| (-100.0..=100.0).contains(&n)).unwrap_or(false)
        }
        FieldRule::Mail => is_mail(text),
        FieldRule::MailArray => split_tokens(text).iter().all(|t| is_mail(t)),
        FieldRule::PhoneNumber => is_phone_number(text),
        FieldRule::PostalCode => is_postal_code(text),
        FieldRule::Url => is_url(text),
        FieldRule::TimeZone => parse_timezone(text).is_some(),
        FieldRule::NumericArray => split_tokens(text)
            .iter()
            .all(|t| t.parse::<f64>().map(|n| n.is_finite()).unwrap_or(false)),
        FieldRule::InventoryName => !text.chars().any(|c| matches!(c, '-' | '\u{2013}' | '\u{2014}' | '.')),
        FieldRule::ExistsIn(allowed) => split_tokens(text)
            .iter()
            .all(|t| allowed.iter().any(|a| a.eq_ignore_ascii_case(t))),
    }
}

fn rule_token(rule: &FieldRule) -> &'static str {
    match rule {
        FieldRule::NotEmpty => tokens::FIELD_REQUIRED,
        FieldRule::Alphanumeric { .. } => tokens::INVALID_LENGTH,
        FieldRule::Numeric => tokens::NOT_A_NUMBER,
        FieldRule::Integer => tokens::NOT_INTEGER,
        FieldRule::Decimal => tokens::INVALID_DECIMAL,
        FieldRule::PositiveDecimal => tokens::NOT_POSITIVE_DECIMAL,
        FieldRule::PositiveInteger => tokens::NOT_POSITIVE_INTEGER,
        FieldRule::MinValue(_) => tokens::INVALID_MIN_VALUE,
        FieldRule::MaxValue(_) => tokens::INVALID_MAX_VALUE,
        FieldRule::Boolean => tokens::NOT_BOOLEAN,
        FieldRule::Date => tokens::INVALID_DATE,
        FieldRule::Percentage => tokens::INVALID_PERCENTAGE_VALUE,
        FieldRule::Mail => tokens::INVALID_EMAIL,
        FieldRule::MailArray => tokens::INVALID_MAIL_ARRAY,
        FieldRule::PhoneNumber => tokens::INVALID_PHONE_NUMBER,
        FieldRule::PostalCode => tokens::INVALID_POSTAL_CODE,
        FieldRule::Url => tokens::INVALID_URL,
        FieldRule::TimeZone => tokens::INVALID_TIME_ZONE,
        FieldRule::NumericArray => tokens::INVALID_NUMERIC_ARRAY,
        FieldRule::InventoryName => tokens::INVALID_INVENTORY_NAME,
        FieldRule::ExistsIn(_) => tokens::INVALID_VALUE,
    }
}

/// 校验单个字段
///
/// # 参数
/// - field_name: 错误挂载的字段（表头）
/// - value: 单元格值
/// - rules: 该列规则（声明顺序）
///
/// # 返回
/// - 所有失败规则对应的 FieldError（空表示通过）
pub fn validate_field(field_name: &str, value: &CellValue, rules: &[FieldRule]) -> Vec<FieldError> {
    let text = value.as_text();
    let mut errors = Vec::new();

    for rule in rules {
        if text.is_empty() {
            if *rule == FieldRule::NotEmpty {
                errors.push(FieldError::field(field_name, tokens::FIELD_REQUIRED));
            }
            // 空值：NOT_EMPTY 失败即短路；其余规则放行
            break;
        }
        if !rule_passes(rule, value, &text) {
            errors.push(FieldError::field(field_name, rule_token(rule)));
        }
    }

    errors
}

/// 校验行级规则
pub fn validate_row_rules(rules: &[RowRule], row: &SheetRow) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for rule in rules {
        match rule {
            RowRule::AtLeastOneNotEmpty(fields) => {
                let any_present = fields.iter().any(|f| !row.text(f).is_empty());
                if !any_present {
                    errors.extend(
                        fields
                            .iter()
                            .map(|f| FieldError::field(*f, tokens::ONE_OF_THIS_FIELDS_REQUIRED)),
                    );
                }
            }
        }
    }
    errors
}

/// 对整行执行 schema 中声明的全部字段规则与行级规则
pub fn validate_row(schema: &SheetSchema, row: &SheetRow) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for column in &schema.columns {
        let value = row.get(column.header).cloned().unwrap_or(CellValue::Empty);
        errors.extend(validate_field(column.header, &value, &column.rules));
    }
    errors.extend(validate_row_rules(&schema.row_rules, row));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(value: &str, rule: FieldRule) -> Vec<String> {
        validate_field("f", &CellValue::from(value), &[rule])
            .into_iter()
            .map(|e| e.message)
            .collect()
    }

    fn passes(value: &str, rule: FieldRule) -> bool {
        check(value, rule).is_empty()
    }

    #[test]
    fn test_not_empty_short_circuits() {
        let errors = validate_field(
            "month",
            &CellValue::Empty,
            &[FieldRule::NotEmpty, FieldRule::Numeric, FieldRule::PositiveInteger],
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, tokens::FIELD_REQUIRED);
        assert_eq!(errors[0].field_name, "month");
    }

    #[test]
    fn test_empty_value_passes_optional_rules() {
        for rule in [
            FieldRule::Numeric,
            FieldRule::Date,
            FieldRule::Mail,
            FieldRule::MailArray,
            FieldRule::Boolean,
            FieldRule::ExistsIn(vec!["a"]),
        ] {
            assert!(passes("", rule.clone()), "{:?}", rule);
            assert!(passes("   ", rule));
        }
    }

    #[test]
    fn test_multiple_failures_all_surface() {
        let errors = validate_field(
            "month",
            &CellValue::from("abc"),
            &[FieldRule::NotEmpty, FieldRule::Numeric, FieldRule::PositiveInteger],
        );
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec![tokens::NOT_A_NUMBER, tokens::NOT_POSITIVE_INTEGER]);
    }

    #[test]
    fn test_numeric_rules() {
        assert!(passes("12.5", FieldRule::Numeric));
        assert!(!passes("12a", FieldRule::Numeric));
        assert!(passes("4", FieldRule::Integer));
        assert!(!passes("4.5", FieldRule::Integer));
        assert!(passes("-75.25", FieldRule::Decimal));
        assert!(!passes("-75.", FieldRule::Decimal));
        assert!(!passes("10.", FieldRule::Decimal));
        assert!(passes("0", FieldRule::PositiveDecimal));
        assert!(!passes("-0.5", FieldRule::PositiveDecimal));
        assert!(passes("0", FieldRule::PositiveInteger));
        assert!(!passes("-1", FieldRule::PositiveInteger));
        assert_eq!(check("0", FieldRule::MinValue(1.0)), vec![tokens::INVALID_MIN_VALUE]);
        assert_eq!(check("13", FieldRule::MaxValue(12.0)), vec![tokens::INVALID_MAX_VALUE]);
        assert!(passes("x", FieldRule::MaxValue(12.0)));
    }

    #[test]
    fn test_number_cell_is_accepted() {
        let errors = validate_field(
            "month",
            &CellValue::Number(3.0),
            &[FieldRule::Numeric, FieldRule::PositiveInteger, FieldRule::MaxValue(12.0)],
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_boolean_tokens() {
        for token in ["TRUE", "false", "1", "0", "X"] {
            assert!(passes(token, FieldRule::Boolean), "{}", token);
        }
        assert_eq!(check("yes", FieldRule::Boolean), vec![tokens::NOT_BOOLEAN]);
        assert!(validate_field("b", &CellValue::Bool(true), &[FieldRule::Boolean]).is_empty());
    }

    #[test]
    fn test_date_and_percentage() {
        assert!(passes("1/5/2024", FieldRule::Date));
        assert_eq!(check("2024-01-05", FieldRule::Date), vec![tokens::INVALID_DATE]);
        assert!(passes("100", FieldRule::Percentage));
        assert!(passes("0", FieldRule::Percentage));
        assert!(passes("-100", FieldRule::Percentage));
        assert!(passes("45%", FieldRule::Percentage));
        assert!(!passes("100.5", FieldRule::Percentage));
        assert!(!passes("-101", FieldRule::Percentage));
    }

    #[test]
    fn test_contact_rules() {
        assert!(passes("leasing@example.com", FieldRule::Mail));
        assert!(!passes("leasing@", FieldRule::Mail));
        assert!(passes("a@b.com, c@d.org", FieldRule::MailArray));
        assert!(!passes("a@b.com, nope", FieldRule::MailArray));
        assert!(passes("(415) 555-0100", FieldRule::PhoneNumber));
        assert!(passes("+14155550100", FieldRule::PhoneNumber));
        assert!(!passes("555-0100", FieldRule::PhoneNumber));
        assert!(passes("94105", FieldRule::PostalCode));
        assert!(passes("94105-1234", FieldRule::PostalCode));
        assert!(!passes("9410", FieldRule::PostalCode));
        assert!(passes("https://example.com/edit", FieldRule::Url));
        assert!(!passes("example dot com", FieldRule::Url));
    }

    #[test]
    fn test_misc_rules() {
        assert!(passes("America/Los_Angeles", FieldRule::TimeZone));
        assert!(!passes("Pacific Time", FieldRule::TimeZone));
        assert!(passes("1, 2, 3.5", FieldRule::NumericArray));
        assert!(!passes("1, two", FieldRule::NumericArray));
        assert!(passes("Unit 101", FieldRule::InventoryName));
        assert!(!passes("Unit-101", FieldRule::InventoryName));
        assert!(!passes("Unit.101", FieldRule::InventoryName));
        assert_eq!(check("abcdef", FieldRule::Alphanumeric { max_len: 5 }), vec![tokens::INVALID_LENGTH]);
    }

    #[test]
    fn test_exists_in_is_case_insensitive_and_multi_value() {
        let rule = FieldRule::ExistsIn(vec!["new", "renewal"]);
        assert!(passes("NEW", rule.clone()));
        assert!(passes("new, Renewal", rule.clone()));
        assert_eq!(check("new, transfer", rule), vec![tokens::INVALID_VALUE]);
    }

    #[test]
    fn test_at_least_one_not_empty() {
        let rules = vec![RowRule::AtLeastOneNotEmpty(vec!["owner", "operator"])];
        let empty = SheetRow::from_pairs([("owner", ""), ("operator", "")]);
        let errors = validate_row_rules(&rules, &empty);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.message == tokens::ONE_OF_THIS_FIELDS_REQUIRED));

        let filled = SheetRow::from_pairs([("owner", "Acme"), ("operator", "")]);
        assert!(validate_row_rules(&rules, &filled).is_empty());
    }
}
