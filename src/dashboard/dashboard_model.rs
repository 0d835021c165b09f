use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::budgets::Budget;
use crate::constants::PROGRESS_MAX;
use crate::expenses::{category_breakdown, Expense};

/// Where the engine stands in observing its sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    /// No source has emitted yet.
    Loading,
    /// Some, but not all, sources have emitted.
    Partial,
    /// Every source has emitted at least once.
    Ready,
}

/// Normalized positions of the goal markers and the running spend on a
/// `[0, max_goal]` scale, for rendering a goal bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalBarPosition {
    pub min_position: f64,
    pub max_position: f64,
    pub spent_position: f64,
}

impl GoalBarPosition {
    /// Positions for a budget's goal range. `None` when the scale is
    /// degenerate (`max_goal <= 0`). Positions are clamped into [0, 1];
    /// spending past the maximum goal pins the marker to the end.
    pub fn for_budget(budget: &Budget, total_spent: Decimal) -> Option<Self> {
        if budget.max_goal <= 0.0 {
            return None;
        }

        let spent = total_spent.to_f64().unwrap_or(0.0);
        Some(GoalBarPosition {
            min_position: (budget.min_goal / budget.max_goal).clamp(0.0, 1.0),
            max_position: 1.0,
            spent_position: (spent / budget.max_goal).clamp(0.0, 1.0),
        })
    }
}

/// The derived view published to dashboard consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetView {
    pub phase: EnginePhase,
    pub current_budget: Option<Budget>,
    pub total_spent: Decimal,
    pub progress_percentage: i32,
    pub remaining: Option<Decimal>,
    pub category_breakdown: HashMap<String, Decimal>,
    pub goal_bar: Option<GoalBarPosition>,
}

impl Default for BudgetView {
    fn default() -> Self {
        BudgetView {
            phase: EnginePhase::Loading,
            current_budget: None,
            total_spent: Decimal::ZERO,
            progress_percentage: 0,
            remaining: None,
            category_breakdown: HashMap::new(),
            goal_bar: None,
        }
    }
}

/// Last-known values of the engine's sources.
///
/// `None` means the source has never emitted; the recompute maps missing
/// inputs to defined fallbacks instead of waiting for a lockstep join.
#[derive(Debug, Clone, Default)]
pub struct EngineSources {
    pub budget: Option<Option<Budget>>,
    pub total_spent: Option<Decimal>,
    pub expenses: Option<Vec<Expense>>,
}

impl EngineSources {
    pub fn phase(&self) -> EnginePhase {
        let observed = [
            self.budget.is_some(),
            self.total_spent.is_some(),
            self.expenses.is_some(),
        ];
        if observed.iter().all(|seen| *seen) {
            EnginePhase::Ready
        } else if observed.iter().any(|seen| *seen) {
            EnginePhase::Partial
        } else {
            EnginePhase::Loading
        }
    }

    /// Derives the view from the last-known values.
    ///
    /// Total over its inputs: never fails, regardless of which sources
    /// have emitted, and independent of the order they emitted in.
    pub fn recompute(&self) -> BudgetView {
        let current_budget = self.budget.clone().flatten();
        let total_spent = self.total_spent.unwrap_or(Decimal::ZERO);
        let category_breakdown = self
            .expenses
            .as_deref()
            .map(category_breakdown)
            .unwrap_or_default();

        let progress_percentage = progress_percentage(current_budget.as_ref(), total_spent);
        let remaining = current_budget
            .as_ref()
            .map(|budget| budget.amount_decimal() - total_spent);
        let goal_bar = current_budget
            .as_ref()
            .and_then(|budget| GoalBarPosition::for_budget(budget, total_spent));

        BudgetView {
            phase: self.phase(),
            current_budget,
            total_spent,
            progress_percentage,
            remaining,
            category_breakdown,
            goal_bar,
        }
    }
}

/// Share of the budget consumed, as an integer in [0, 100].
///
/// Truncates toward zero after clamping; a missing budget or one with a
/// non-positive amount yields 0 rather than a division error.
pub fn progress_percentage(budget: Option<&Budget>, total_spent: Decimal) -> i32 {
    let amount = match budget {
        Some(budget) if budget.amount > 0.0 => budget.amount,
        _ => return 0,
    };

    let spent = total_spent.to_f64().unwrap_or(0.0);
    let ratio = spent / amount * f64::from(PROGRESS_MAX);
    ratio.clamp(0.0, f64::from(PROGRESS_MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use num_traits::FromPrimitive;

    fn budget(amount: f64, min_goal: f64, max_goal: f64) -> Budget {
        Budget {
            id: 1,
            user_id: 1,
            budget_type: "Monthly".to_string(),
            amount,
            min_goal,
            max_goal,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn expense(category: &str, amount: f64) -> Expense {
        Expense {
            id: 0,
            user_id: 1,
            name: "x".to_string(),
            category_id: None,
            category: category.to_string(),
            amount,
            date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            image_ref: None,
        }
    }

    #[test]
    fn test_progress_clamps_and_truncates() {
        let b = budget(1000.0, 0.0, 0.0);
        assert_eq!(
            progress_percentage(Some(&b), Decimal::from_f64(385.9).unwrap()),
            38
        );
        assert_eq!(progress_percentage(Some(&b), Decimal::from(2_000)), 100);
        assert_eq!(progress_percentage(Some(&b), Decimal::from(-50)), 0);
    }

    #[test]
    fn test_progress_is_zero_without_budget_or_amount() {
        assert_eq!(progress_percentage(None, Decimal::from(500)), 0);

        let zero = budget(0.0, 0.0, 0.0);
        assert_eq!(progress_percentage(Some(&zero), Decimal::from(500)), 0);
    }

    #[test]
    fn test_recompute_with_only_expenses_observed() {
        let sources = EngineSources {
            budget: None,
            total_spent: Some(Decimal::from(300)),
            expenses: Some(vec![expense("Transport", 300.0)]),
        };

        let view = sources.recompute();
        assert_eq!(view.phase, EnginePhase::Partial);
        assert!(view.current_budget.is_none());
        assert_eq!(view.progress_percentage, 0);
        assert!(view.remaining.is_none());
        assert_eq!(view.category_breakdown["Transport"], Decimal::from(300));
    }

    #[test]
    fn test_recompute_full_scenario() {
        let sources = EngineSources {
            budget: Some(Some(budget(2000.0, 500.0, 1800.0))),
            total_spent: Some(Decimal::from(750)),
            expenses: Some(vec![expense("Transport", 400.0), expense("Transport", 350.0)]),
        };

        let view = sources.recompute();
        assert_eq!(view.phase, EnginePhase::Ready);
        assert_eq!(view.progress_percentage, 38);
        assert_eq!(view.remaining, Some(Decimal::from(1250)));
        assert_eq!(view.category_breakdown["Transport"], Decimal::from(750));

        let goal_bar = view.goal_bar.unwrap();
        assert!((goal_bar.min_position - 500.0 / 1800.0).abs() < 1e-12);
        assert_eq!(goal_bar.max_position, 1.0);
        assert!((goal_bar.spent_position - 750.0 / 1800.0).abs() < 1e-12);
    }

    #[test]
    fn test_overspending_is_a_valid_negative_remaining() {
        let sources = EngineSources {
            budget: Some(Some(budget(100.0, 0.0, 50.0))),
            total_spent: Some(Decimal::from(150)),
            expenses: Some(vec![]),
        };

        let view = sources.recompute();
        assert_eq!(view.remaining, Some(Decimal::from(-50)));
        assert_eq!(view.progress_percentage, 100);
        assert_eq!(view.goal_bar.unwrap().spent_position, 1.0);
    }

    #[test]
    fn test_goal_bar_absent_for_degenerate_scale() {
        let b = budget(100.0, 10.0, 0.0);
        assert!(GoalBarPosition::for_budget(&b, Decimal::ZERO).is_none());
    }
}
