use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::expense::parse_amount;
use super::{lenient_date, required_date, required_text, Money, RecordId};
use crate::error::FinanceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    #[serde(default, skip_serializing_if = "RecordId::is_blank")]
    pub id: RecordId,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub amount: Money,
    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct IncomeForm {
    pub source: String,
    pub amount: String,
    pub date: String,
}

impl IncomeForm {
    pub fn validate(&self) -> Result<Income, FinanceError> {
        let source = required_text(&self.source, "Source is required")?;
        let amount = parse_amount(&self.amount)?;
        let date = required_date(&self.date)?;
        Ok(Income {
            id: RecordId::default(),
            source,
            amount,
            date: Some(date),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl IncomePatch {
    pub fn validate(&self) -> Result<(), FinanceError> {
        if let Some(source) = &self.source {
            required_text(source, "Source is required")?;
        }
        if self.amount.is_some_and(|a| a.is_negative()) {
            return Err(FinanceError::validation("Amount cannot be negative"));
        }
        Ok(())
    }

    pub fn apply_to(&self, income: &mut Income) {
        if let Some(source) = &self.source {
            income.source = source.trim().to_string();
        }
        if let Some(amount) = self.amount {
            income.amount = amount;
        }
        if let Some(date) = self.date {
            income.date = Some(date);
        }
    }
}
