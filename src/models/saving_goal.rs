use serde::{Deserialize, Serialize};

use super::{required_text, Money, RecordId};
use crate::error::FinanceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    #[serde(default, skip_serializing_if = "RecordId::is_blank")]
    pub id: RecordId,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub target_amount: Money,
    #[serde(default)]
    pub saved_amount: Money,
}

impl SavingsGoal {
    pub fn is_achieved(&self) -> bool {
        self.target_amount.is_positive() && self.saved_amount >= self.target_amount
    }
}

#[derive(Debug, Clone, Default)]
pub struct SavingsForm {
    pub goal: String,
    pub target: String,
}

impl SavingsForm {
    /// New goals always start with nothing saved.
    pub fn validate(&self) -> Result<SavingsGoal, FinanceError> {
        let goal = required_text(&self.goal, "Goal is required")?;
        if self.target.trim().is_empty() {
            return Err(FinanceError::validation("Target amount is required"));
        }
        let target_amount =
            Money::parse(&self.target).ok_or_else(|| FinanceError::validation("Invalid amount format"))?;
        if !target_amount.is_positive() {
            return Err(FinanceError::validation("Target amount must be greater than zero"));
        }
        Ok(SavingsGoal {
            id: RecordId::default(),
            goal,
            target_amount,
            saved_amount: Money::zero(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_amount: Option<Money>,
}

impl SavingsPatch {
    pub fn validate(&self) -> Result<(), FinanceError> {
        if let Some(goal) = &self.goal {
            required_text(goal, "Goal is required")?;
        }
        if self.target_amount.is_some_and(|t| !t.is_positive()) {
            return Err(FinanceError::validation("Target amount must be greater than zero"));
        }
        if self.saved_amount.is_some_and(|s| s.is_negative()) {
            return Err(FinanceError::validation("Saved amount cannot be negative"));
        }
        Ok(())
    }

    pub fn apply_to(&self, goal: &mut SavingsGoal) {
        if let Some(label) = &self.goal {
            goal.goal = label.trim().to_string();
        }
        if let Some(target) = self.target_amount {
            goal.target_amount = target;
        }
        if let Some(saved) = self.saved_amount {
            goal.saved_amount = saved;
        }
    }
}
