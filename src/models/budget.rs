use serde::{Deserialize, Serialize};

use super::{Category, Money, RecordId};
use crate::error::FinanceError;

/// A spending limit for one category. How much has been spent is never stored
/// here: it is derived from the expense store (see `reports::budget_progress`),
/// and a `spent` value sent by the backend is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default, skip_serializing_if = "RecordId::is_blank")]
    pub id: RecordId,
    #[serde(default)]
    pub category: Category,
    #[serde(default, alias = "limit")]
    pub limit_amount: Money,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetForm {
    pub category: String,
    pub limit: String,
}

impl BudgetForm {
    pub fn validate(&self) -> Result<Budget, FinanceError> {
        let category = Category::parse(&self.category);
        if category.is_blank() {
            return Err(FinanceError::validation("Category is required"));
        }
        let limit_amount = parse_limit(&self.limit)?;
        Ok(Budget {
            id: RecordId::default(),
            category,
            limit_amount,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_amount: Option<Money>,
}

impl BudgetPatch {
    pub fn validate(&self) -> Result<(), FinanceError> {
        if self.category.as_ref().is_some_and(Category::is_blank) {
            return Err(FinanceError::validation("Category is required"));
        }
        if self.limit_amount.is_some_and(|l| !l.is_positive()) {
            return Err(FinanceError::validation("Budget limit must be greater than zero"));
        }
        Ok(())
    }

    pub fn apply_to(&self, budget: &mut Budget) {
        if let Some(category) = &self.category {
            budget.category = category.clone();
        }
        if let Some(limit) = self.limit_amount {
            budget.limit_amount = limit;
        }
    }
}

fn parse_limit(raw: &str) -> Result<Money, FinanceError> {
    if raw.trim().is_empty() {
        return Err(FinanceError::validation("Budget limit is required"));
    }
    let limit = Money::parse(raw).ok_or_else(|| {
        FinanceError::validation(format!("Invalid budget amount '{}'. Must be a valid number", raw.trim()))
    })?;
    if !limit.is_positive() {
        return Err(FinanceError::validation("Budget limit must be greater than zero"));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_form_success() {
        let budget = BudgetForm {
            category: " Food ".into(),
            limit: "100.50".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(budget.category, Category::Food);
        assert_eq!(budget.limit_amount.to_string(), "100.5");
    }

    #[test]
    fn test_budget_form_invalid_amount() {
        let err = BudgetForm {
            category: "Food".into(),
            limit: "not-a-number".into(),
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("Invalid budget amount"));
    }

    #[test]
    fn test_budget_form_rejects_zero_limit() {
        let err = BudgetForm {
            category: "Food".into(),
            limit: "0".into(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, FinanceError::validation("Budget limit must be greater than zero"));
    }

    #[test]
    fn test_budget_form_empty_category() {
        let err = BudgetForm {
            category: "".into(),
            limit: "100".into(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, FinanceError::validation("Category is required"));
    }

    #[test]
    fn test_server_spent_is_ignored() {
        let raw = r#"{"id":"b1","category":"Rent","limitAmount":"900","spent":12345}"#;
        let budget: Budget = serde_json::from_str(raw).unwrap();
        assert_eq!(budget.limit_amount, Money::from(900));
        assert!(!serde_json::to_string(&budget).unwrap().contains("spent"));
    }

    #[test]
    fn test_legacy_limit_field() {
        let budget: Budget = serde_json::from_str(r#"{"category":"food","limit":50}"#).unwrap();
        assert_eq!(budget.limit_amount, Money::from(50));
    }
}
