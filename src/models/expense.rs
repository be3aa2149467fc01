use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{lenient_date, required_date, required_text, Category, Money, RecordId};
use crate::error::FinanceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default, skip_serializing_if = "RecordId::is_blank")]
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub amount: Money,
    #[serde(default)]
    pub category: Category,
    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Raw values as typed into the add-expense form.
#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub title: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl ExpenseForm {
    pub fn validate(&self) -> Result<Expense, FinanceError> {
        let title = required_text(&self.title, "Title is required")?;
        let amount = parse_amount(&self.amount)?;
        let category = Category::parse(&self.category);
        if category.is_blank() {
            return Err(FinanceError::validation("Category is required"));
        }
        let date = required_date(&self.date)?;

        Ok(Expense {
            id: RecordId::default(),
            title,
            amount,
            category,
            date: Some(date),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl ExpensePatch {
    pub fn validate(&self) -> Result<(), FinanceError> {
        if let Some(title) = &self.title {
            required_text(title, "Title is required")?;
        }
        if self.amount.is_some_and(|a| a.is_negative()) {
            return Err(FinanceError::validation("Amount cannot be negative"));
        }
        if self.category.as_ref().is_some_and(Category::is_blank) {
            return Err(FinanceError::validation("Category is required"));
        }
        Ok(())
    }

    pub fn apply_to(&self, expense: &mut Expense) {
        if let Some(title) = &self.title {
            expense.title = title.trim().to_string();
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(category) = &self.category {
            expense.category = category.clone();
        }
        if let Some(date) = self.date {
            expense.date = Some(date);
        }
    }
}

/// Required, parseable, not negative.
pub(crate) fn parse_amount(raw: &str) -> Result<Money, FinanceError> {
    if raw.trim().is_empty() {
        return Err(FinanceError::validation("Amount cannot be empty"));
    }
    let amount = Money::parse(raw).ok_or_else(|| FinanceError::validation("Invalid amount format"))?;
    if amount.is_negative() {
        return Err(FinanceError::validation("Amount cannot be negative"));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ExpenseForm {
        ExpenseForm {
            title: "Groceries".into(),
            amount: "42.50".into(),
            category: "Food".into(),
            date: "2024-06-01".into(),
        }
    }

    #[test]
    fn valid_form_builds_expense() {
        let expense = form().validate().unwrap();
        assert_eq!(expense.title, "Groceries");
        assert_eq!(expense.category, Category::Food);
        assert_eq!(expense.amount.to_string(), "42.5");
        assert!(expense.id.is_blank());
    }

    #[test]
    fn every_field_is_required() {
        let cases = [
            (ExpenseForm { title: " ".into(), ..form() }, "Title is required"),
            (ExpenseForm { amount: "".into(), ..form() }, "Amount cannot be empty"),
            (ExpenseForm { amount: "ten".into(), ..form() }, "Invalid amount format"),
            (ExpenseForm { amount: "-3".into(), ..form() }, "Amount cannot be negative"),
            (ExpenseForm { category: "".into(), ..form() }, "Category is required"),
            (ExpenseForm { date: "".into(), ..form() }, "Date is required"),
            (ExpenseForm { date: "June 1".into(), ..form() }, "Format: YYYY-MM-DD"),
        ];
        for (form, message) in cases {
            assert_eq!(form.validate().unwrap_err(), FinanceError::validation(message));
        }
    }

    #[test]
    fn malformed_wire_record_still_parses() {
        let raw = r#"{"id": 9, "title": "Taxi", "amount": "n/a", "category": null, "owner": "a@b.c"}"#;
        let expense: Expense = serde_json::from_str(raw).unwrap();
        assert_eq!(expense.id.as_str(), "9");
        assert!(expense.amount.is_zero());
        assert!(expense.category.is_blank());
        assert_eq!(expense.date, None);
    }

    #[test]
    fn patch_serializes_only_changed_fields() {
        let patch = ExpensePatch {
            amount: Some(Money::from(12)),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"amount":12}"#);
    }
}
