use rust_decimal::Decimal;

use super::percent;
use crate::models::{Money, SavingsGoal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavingsProgress {
    pub saved: Money,
    pub target: Money,
    pub percent: Decimal,
    /// Never negative; zero once the goal is reached.
    pub remaining: Money,
    pub achieved: bool,
}

pub fn savings_progress(goal: &SavingsGoal) -> SavingsProgress {
    let remaining = goal.target_amount - goal.saved_amount;
    SavingsProgress {
        saved: goal.saved_amount,
        target: goal.target_amount,
        percent: percent(goal.saved_amount, goal.target_amount).min(Decimal::ONE_HUNDRED),
        remaining: remaining.max(Money::zero()),
        achieved: goal.is_achieved(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;

    fn goal(target: i64, saved: i64) -> SavingsGoal {
        SavingsGoal {
            id: RecordId::new("g"),
            goal: "Bike".into(),
            target_amount: Money::from(target),
            saved_amount: Money::from(saved),
        }
    }

    #[test]
    fn progress_tracks_saved_amount() {
        let progress = savings_progress(&goal(1000, 400));
        assert_eq!(progress.percent, Decimal::from(40));
        assert_eq!(progress.remaining, Money::from(600));
        assert!(!progress.achieved);
    }

    #[test]
    fn overshooting_caps_at_one_hundred() {
        let progress = savings_progress(&goal(1000, 1250));
        assert_eq!(progress.percent, Decimal::ONE_HUNDRED);
        assert!(progress.remaining.is_zero());
        assert!(progress.achieved);
    }

    #[test]
    fn zero_target_is_zero_percent() {
        let progress = savings_progress(&goal(0, 50));
        assert!(progress.percent.is_zero());
        assert!(!progress.achieved);
    }
}
