// ==========================================
// 数据泵 - 费用类型校验
// ==========================================
// 规则（按 feeType）:
// - penalty 不得填写报价分区
// - service 必须有服务周期；penalty/deposit/leaseBreak 只允许 oneTime
// - inventoryGroup 不填价格，其余类型至少填一个价格
// - 只有 deposit 可设置计息；deposit 不得关联其他费用
// ==========================================

use crate::domain::entity::{text_of, Entity};
use crate::domain::outcome::FieldError;
use crate::importer::custom_validator::CustomCheck;
use serde_json::Value;

pub const QUOTE_SECTION_NOT_ALLOWED: &str = "QUOTE_SECTION_NAME_SHOULD_BE_EMPTY_FOR_PENALTY";
pub const INVALID_SERVICE_PERIOD: &str = "INVALID_SERVICE_PERIOD_FOR_TYPE";
pub const SERVICE_PERIOD_REQUIRED: &str = "MUST_HAVE_VALID_SERVICE_PERIOD_FOR_SERVICE_TYPE";
pub const PRICE_REQUIRED: &str = "RELATIVE_AND_ABSOLUTE_PRICE_SHOULD_NOT_BE_EMPTY_EXCEPT_INVENTORY_GROUP";
pub const RELATIVE_PRICE_NOT_ALLOWED: &str = "RELATIVE_PRICE_SHOULD_BE_EMPTY_FOR_INVENTORY_GROUP";
pub const ABSOLUTE_PRICE_NOT_ALLOWED: &str = "ABSOLUTE_PRICE_SHOULD_BE_EMPTY_FOR_INVENTORY_GROUP";
pub const DEPOSIT_INTEREST_NOT_ALLOWED: &str = "DEPOSIT_FLAG_SHOULD_BE_EMPTY_FOR_NON_DEPOSIT_FEES";
pub const RELATED_FEES_NOT_ALLOWED: &str = "RELATED_FEES_SHOULD_BE_EMPTY_FOR_DEPOSIT_FEES";
pub const ADDITIONAL_FEES_NOT_ALLOWED: &str = "ADDITIONAL_FEES_SHOULD_BE_EMPTY_FOR_DEPOSIT_FEES";

/// 服务周期 oneTime（小写比较）
const ONE_TIME: &str = "onetime";

pub struct FeeTypeRules;

fn flag(entity: &Entity, field: &str) -> bool {
    matches!(entity.get(field), Some(Value::Bool(true)))
}

fn lower(entity: &Entity, field: &str) -> Option<String> {
    text_of(entity, field).map(|v| v.to_lowercase())
}

impl CustomCheck for FeeTypeRules {
    fn check(&mut self, entity: &Entity, _index: usize, _all_rows: &[Entity]) -> Vec<FieldError> {
        let fee_type = lower(entity, "feeType").unwrap_or_default();
        let mut errors = Vec::new();

        if fee_type == "penalty" && text_of(entity, "quoteSectionName").is_some() {
            errors.push(FieldError::custom("quoteSectionName", QUOTE_SECTION_NOT_ALLOWED));
        }

        match lower(entity, "servicePeriod") {
            None if fee_type == "service" => {
                errors.push(FieldError::custom("servicePeriod", SERVICE_PERIOD_REQUIRED));
            }
            Some(period)
                if matches!(fee_type.as_str(), "penalty" | "deposit" | "leasebreak")
                    && period != ONE_TIME =>
            {
                errors.push(FieldError::custom("servicePeriod", INVALID_SERVICE_PERIOD));
            }
            _ => {}
        }

        let relative = text_of(entity, "relativePrice").is_some();
        let absolute = text_of(entity, "absolutePrice").is_some();
        if fee_type == "inventorygroup" {
            if relative {
                errors.push(FieldError::custom("relativePrice", RELATIVE_PRICE_NOT_ALLOWED));
            }
            if absolute {
                errors.push(FieldError::custom("absolutePrice", ABSOLUTE_PRICE_NOT_ALLOWED));
            }
        } else if !relative && !absolute {
            errors.push(FieldError::custom("relativePrice", PRICE_REQUIRED));
            errors.push(FieldError::custom("absolutePrice", PRICE_REQUIRED));
        }

        if fee_type == "deposit" {
            if text_of(entity, "relatedFees").is_some() {
                errors.push(FieldError::custom("relatedFees", RELATED_FEES_NOT_ALLOWED));
            }
            if text_of(entity, "additionalFees").is_some() {
                errors.push(FieldError::custom("additionalFees", ADDITIONAL_FEES_NOT_ALLOWED));
            }
        } else if flag(entity, "depositInterestFlag") {
            errors.push(FieldError::custom("depositInterestFlag", DEPOSIT_INTEREST_NOT_ALLOWED));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: serde_json::Value) -> Vec<(String, String)> {
        let entity = value.as_object().cloned().unwrap();
        FeeTypeRules
            .check(&entity, 0, &[])
            .into_iter()
            .map(|e| (e.field_name, e.message))
            .collect()
    }

    #[test]
    fn test_priced_service_fee_passes() {
        let errors = run(json!({"feeType": "service", "servicePeriod": "month", "absolutePrice": 25}));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_service_fee_needs_period() {
        let errors = run(json!({"feeType": "Service", "absolutePrice": 25}));
        assert_eq!(
            errors,
            vec![("servicePeriod".to_string(), SERVICE_PERIOD_REQUIRED.to_string())]
        );
    }

    #[test]
    fn test_inventory_group_fee_has_no_price() {
        assert!(run(json!({"feeType": "inventoryGroup"})).is_empty());
        let errors = run(json!({"feeType": "inventoryGroup", "relativePrice": 10}));
        assert_eq!(errors[0].1, RELATIVE_PRICE_NOT_ALLOWED);
    }

    #[test]
    fn test_missing_price_reported_on_both_fields() {
        let errors = run(json!({"feeType": "application", "relativePrice": null, "absolutePrice": null}));
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["relativePrice", "absolutePrice"]);
    }

    #[test]
    fn test_deposit_rules() {
        let errors = run(json!({
            "feeType": "deposit",
            "absolutePrice": 500,
            "servicePeriod": "month",
            "relatedFees": ["Rent"]
        }));
        let messages: Vec<&str> = errors.iter().map(|(_, m)| m.as_str()).collect();
        assert_eq!(messages, vec![INVALID_SERVICE_PERIOD, RELATED_FEES_NOT_ALLOWED]);

        let errors = run(json!({"feeType": "penalty", "absolutePrice": 50, "depositInterestFlag": true}));
        assert_eq!(errors[0].1, DEPOSIT_INTEREST_NOT_ALLOWED);
    }
}
