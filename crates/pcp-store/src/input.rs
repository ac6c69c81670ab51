//! 寫入邊界的輸入驗證

use pcp_core::{MonthKey, Result, ValidationErrors};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SKU_CODE_MAX: usize = 50;
const SKU_DESCRIPTION_MAX: usize = 255;
const SKU_UNIT_MAX: usize = 10;
const ORDER_NOTES_MAX: usize = 500;

/// SKU 表單輸入
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuInput {
    pub code: String,
    pub description: String,
    pub unit_of_measure: String,
}

/// 通過驗證的 SKU 輸入（已去除前後空白）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSku {
    pub code: String,
    pub description: String,
    pub unit_of_measure: String,
}

impl SkuInput {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        unit_of_measure: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            unit_of_measure: unit_of_measure.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidSku> {
        let mut errors = ValidationErrors::new();
        let code = required_text(&mut errors, "code", &self.code, SKU_CODE_MAX);
        let description =
            required_text(&mut errors, "description", &self.description, SKU_DESCRIPTION_MAX);
        let unit_of_measure =
            required_text(&mut errors, "unit_of_measure", &self.unit_of_measure, SKU_UNIT_MAX);

        errors.into_result(ValidSku {
            code,
            description,
            unit_of_measure,
        })
    }
}

/// 生產訂單表單輸入
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOrderInput {
    pub sku_id: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// 通過驗證的生產訂單輸入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidOrder {
    pub sku_id: Uuid,
    pub quantity: u64,
    pub notes: Option<String>,
}

impl ProductionOrderInput {
    pub fn new(sku_id: Uuid, quantity: i64) -> Self {
        Self {
            sku_id: sku_id.to_string(),
            quantity,
            notes: None,
        }
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<ValidOrder> {
        let mut errors = ValidationErrors::new();
        let sku_id = sku_reference(&mut errors, &self.sku_id);
        let quantity = positive_quantity(&mut errors, "quantity", self.quantity);

        let notes = self.notes.as_ref().map(|n| n.trim().to_string());
        if let Some(notes) = &notes {
            if notes.chars().count() > ORDER_NOTES_MAX {
                errors.add("notes", format!("備註最多 {} 個字元", ORDER_NOTES_MAX));
            }
        }

        errors.into_result(ValidOrder {
            sku_id,
            quantity,
            notes,
        })
    }
}

/// 需求表單輸入
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandInput {
    pub sku_id: String,
    pub month_year: String,
    pub target_quantity: i64,
}

/// 通過驗證的需求輸入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDemand {
    pub sku_id: Uuid,
    pub month: MonthKey,
    pub target_quantity: u64,
}

impl DemandInput {
    pub fn new(sku_id: Uuid, month_year: impl Into<String>, target_quantity: i64) -> Self {
        Self {
            sku_id: sku_id.to_string(),
            month_year: month_year.into(),
            target_quantity,
        }
    }

    pub fn validate(&self) -> Result<ValidDemand> {
        let mut errors = ValidationErrors::new();
        let sku_id = sku_reference(&mut errors, &self.sku_id);
        let target_quantity = positive_quantity(&mut errors, "target_quantity", self.target_quantity);

        let month = match self.month_year.trim().parse::<MonthKey>() {
            Ok(month) => Some(month),
            Err(_) => {
                errors.add("month_year", "月份必須為 YYYY-MM 格式");
                None
            }
        };

        match month {
            Some(month) if errors.is_empty() => Ok(ValidDemand {
                sku_id,
                month,
                target_quantity,
            }),
            _ => Err(pcp_core::PcpError::Validation(errors)),
        }
    }
}

fn required_text(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "此欄位為必填");
    } else if trimmed.chars().count() > max {
        errors.add(field, format!("最多 {} 個字元", max));
    }
    trimmed.to_string()
}

fn sku_reference(errors: &mut ValidationErrors, raw: &str) -> Uuid {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add("sku_id", "SKU 為必填");
        return Uuid::nil();
    }
    match Uuid::parse_str(raw) {
        Ok(id) => id,
        Err(_) => {
            errors.add("sku_id", "SKU 識別碼無效");
            Uuid::nil()
        }
    }
}

fn positive_quantity(errors: &mut ValidationErrors, field: &str, value: i64) -> u64 {
    if value <= 0 {
        errors.add(field, "數量必須大於 0");
        return 0;
    }
    value as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcp_core::PcpError;
    use rstest::rstest;

    fn field_errors(result: Result<impl std::fmt::Debug>) -> ValidationErrors {
        match result {
            Err(PcpError::Validation(errors)) => errors,
            other => panic!("預期驗證錯誤，實際為 {:?}", other),
        }
    }

    #[test]
    fn test_valid_sku_is_trimmed() {
        let valid = SkuInput::new("  PNL-001 ", "太陽能面板", "pc").validate().unwrap();
        assert_eq!(valid.code, "PNL-001");
    }

    #[rstest]
    #[case(SkuInput::new("", "描述", "pc"), "code")]
    #[case(SkuInput::new("   ", "描述", "pc"), "code")]
    #[case(SkuInput::new("X".repeat(51), "描述", "pc"), "code")]
    #[case(SkuInput::new("PNL", "", "pc"), "description")]
    #[case(SkuInput::new("PNL", "d".repeat(256), "pc"), "description")]
    #[case(SkuInput::new("PNL", "描述", "kilogramas!"), "unit_of_measure")]
    fn test_invalid_sku(#[case] input: SkuInput, #[case] field: &str) {
        let errors = field_errors(input.validate());
        assert!(errors.has(field), "缺少欄位錯誤 {}: {}", field, errors);
        assert_eq!(errors.fields.len(), 1);
    }

    #[test]
    fn test_sku_limits_count_characters() {
        // 10 個中文字元（30 bytes）仍在限制內
        let unit = "公".repeat(10);
        assert!(SkuInput::new("PNL", "描述", unit).validate().is_ok());
    }

    #[test]
    fn test_valid_order() {
        let sku_id = Uuid::new_v4();
        let valid = ProductionOrderInput::new(sku_id, 100)
            .with_notes(" 夜班 ")
            .validate()
            .unwrap();

        assert_eq!(valid.sku_id, sku_id);
        assert_eq!(valid.quantity, 100);
        assert_eq!(valid.notes.as_deref(), Some("夜班"));
    }

    #[rstest]
    #[case(0, "quantity")]
    #[case(-5, "quantity")]
    fn test_invalid_order_quantity(#[case] quantity: i64, #[case] field: &str) {
        let errors = field_errors(ProductionOrderInput::new(Uuid::new_v4(), quantity).validate());
        assert!(errors.has(field));
    }

    #[test]
    fn test_invalid_order_collects_all_fields() {
        let input = ProductionOrderInput {
            sku_id: "not-a-uuid".to_string(),
            quantity: 0,
            notes: Some("n".repeat(501)),
        };
        let errors = field_errors(input.validate());

        assert!(errors.has("sku_id"));
        assert!(errors.has("quantity"));
        assert!(errors.has("notes"));
    }

    #[test]
    fn test_valid_demand() {
        let sku_id = Uuid::new_v4();
        let valid = DemandInput::new(sku_id, "2024-07", 250).validate().unwrap();

        assert_eq!(valid.month.to_string(), "2024-07");
        assert_eq!(valid.target_quantity, 250);
    }

    #[rstest]
    #[case("2024-7", 10, "month_year")]
    #[case("2024-13", 10, "month_year")]
    #[case("07-2024", 10, "month_year")]
    #[case("2024-07", 0, "target_quantity")]
    fn test_invalid_demand(#[case] month: &str, #[case] target: i64, #[case] field: &str) {
        let errors = field_errors(DemandInput::new(Uuid::new_v4(), month, target).validate());
        assert!(errors.has(field));
    }

    #[test]
    fn test_missing_sku_reference() {
        let input = DemandInput {
            sku_id: String::new(),
            month_year: "2024-07".to_string(),
            target_quantity: 10,
        };
        assert!(field_errors(input.validate()).has("sku_id"));
    }
}
