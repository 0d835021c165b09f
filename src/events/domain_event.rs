//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::users::UserId;

/// Domain events emitted after successful committed mutations.
///
/// Events carry the owning user id so per-user observers can ignore
/// changes to other tenants' rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Budget rows were created or deleted for a user.
    BudgetsChanged { user_id: UserId },

    /// Category rows were created, updated, or deleted for a user.
    CategoriesChanged { user_id: UserId },

    /// Expense rows were created or deleted for a user.
    ExpensesChanged { user_id: UserId },

    /// A user row was created or updated.
    UsersChanged { user_id: UserId },
}

impl DomainEvent {
    pub fn budgets_changed(user_id: UserId) -> Self {
        Self::BudgetsChanged { user_id }
    }

    pub fn categories_changed(user_id: UserId) -> Self {
        Self::CategoriesChanged { user_id }
    }

    pub fn expenses_changed(user_id: UserId) -> Self {
        Self::ExpensesChanged { user_id }
    }

    pub fn users_changed(user_id: UserId) -> Self {
        Self::UsersChanged { user_id }
    }

    /// The user whose rows the event refers to.
    pub fn user_id(&self) -> UserId {
        match self {
            Self::BudgetsChanged { user_id }
            | Self::CategoriesChanged { user_id }
            | Self::ExpensesChanged { user_id }
            | Self::UsersChanged { user_id } => *user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_event_serialization() {
        let event = DomainEvent::expenses_changed(7);

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("expenses_changed"));

        let deserialized: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
        assert_eq!(deserialized.user_id(), 7);
    }
}
