use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::users::UserId;

/// One recorded expense.
///
/// `category` is the denormalized display name used for grouping;
/// `category_id` is the stable reference and stays `None` when the name
/// never matched a category row (orphaned names are tolerated).
#[derive(
    Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::expenses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i32,
    pub user_id: UserId,
    pub name: String,
    pub category_id: Option<i32>,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub image_ref: Option<String>,
}

impl Expense {
    pub fn amount_decimal(&self) -> Decimal {
        Decimal::from_f64(self.amount).unwrap_or(Decimal::ZERO)
    }
}

/// Input for recording an expense
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub name: String,
    pub category_id: Option<i32>,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub image_ref: Option<String>,
}

/// Groups expenses by category name and sums their amounts.
///
/// Always computed from the full list it is given; expenses whose
/// category name has no matching category row still contribute under
/// their recorded name.
pub fn category_breakdown(expenses: &[Expense]) -> HashMap<String, Decimal> {
    let mut breakdown: HashMap<String, Decimal> = HashMap::new();
    for expense in expenses {
        *breakdown
            .entry(expense.category.clone())
            .or_insert(Decimal::ZERO) += expense.amount_decimal();
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expense(category: &str, amount: f64) -> Expense {
        Expense {
            id: 0,
            user_id: 1,
            name: "test".to_string(),
            category_id: None,
            category: category.to_string(),
            amount,
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            image_ref: None,
        }
    }

    #[test]
    fn test_breakdown_groups_by_name() {
        let expenses = vec![
            expense("Transport", 400.0),
            expense("Transport", 350.0),
            expense("Groceries", 120.5),
        ];

        let breakdown = category_breakdown(&expenses);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown["Transport"], Decimal::from(750));
        assert_eq!(
            breakdown["Groceries"],
            Decimal::from_f64(120.5).unwrap()
        );
    }

    #[test]
    fn test_breakdown_of_empty_list_is_empty() {
        assert!(category_breakdown(&[]).is_empty());
    }
}
