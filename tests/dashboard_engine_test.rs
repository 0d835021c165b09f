mod common;

use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use spendloom_core::budgets::{BudgetType, NewBudget};
use spendloom_core::dashboard::EnginePhase;
use spendloom_core::errors::{Error, SessionError};
use spendloom_core::expenses::NewExpense;
use spendloom_core::session::SessionContext;

fn monthly_budget(amount: f64, min_goal: f64, max_goal: f64) -> NewBudget {
    NewBudget {
        budget_type: BudgetType::MONTHLY.to_string(),
        amount,
        min_goal,
        max_goal,
    }
}

fn expense(name: &str, category: &str, amount: f64, day: u32) -> NewExpense {
    NewExpense {
        name: name.to_string(),
        category_id: None,
        category: category.to_string(),
        amount,
        date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        image_ref: None,
    }
}

#[tokio::test]
async fn test_engine_derives_the_dashboard_scenario() {
    let app = common::setup().await;
    let session = common::open_session(&app, "scenario").await;
    let mut view_rx = session.engine.subscribe();

    session
        .engine
        .record_budget(monthly_budget(2000.0, 500.0, 1800.0))
        .await
        .unwrap();
    session
        .expense_service
        .record_expense(expense("Bus pass", "Transport", 400.0, 2))
        .await
        .unwrap();
    session
        .expense_service
        .record_expense(expense("Fuel", "Transport", 350.0, 3))
        .await
        .unwrap();

    let view = common::wait_for_view(&mut view_rx, |view| {
        view.phase == EnginePhase::Ready
            && view.total_spent == Decimal::from(750)
            && view.current_budget.is_some()
            && view.category_breakdown.contains_key("Transport")
    })
    .await;

    assert_eq!(view.progress_percentage, 38);
    assert_eq!(view.remaining, Some(Decimal::from(1250)));
    assert_eq!(view.category_breakdown["Transport"], Decimal::from(750));

    let goal_bar = view.goal_bar.unwrap();
    assert!((goal_bar.min_position - 500.0 / 1800.0).abs() < 1e-12);
    assert_eq!(goal_bar.max_position, 1.0);
    assert!((goal_bar.spent_position - 750.0 / 1800.0).abs() < 1e-12);

    // Accessors agree with the published snapshot.
    assert_eq!(session.engine.progress_percentage(), 38);
    assert_eq!(session.engine.total_spent(), Decimal::from(750));
}

#[tokio::test]
async fn test_view_converges_regardless_of_write_order() {
    let app = common::setup().await;
    let session = common::open_session(&app, "ordering").await;
    let mut view_rx = session.engine.subscribe();

    // Expenses land before any budget is observed.
    session
        .expense_service
        .record_expense(expense("Groceries run", "Groceries", 300.0, 4))
        .await
        .unwrap();

    let partial = common::wait_for_view(&mut view_rx, |view| {
        view.total_spent == Decimal::from(300)
    })
    .await;
    assert!(partial.current_budget.is_none());
    assert_eq!(partial.progress_percentage, 0);
    assert_eq!(partial.remaining, None);

    // Budget and a second expense interleave; the final view is the same
    // as if everything had arrived in order.
    session
        .engine
        .record_budget(monthly_budget(1000.0, 100.0, 900.0))
        .await
        .unwrap();
    session
        .expense_service
        .record_expense(expense("More groceries", "Groceries", 400.0, 5))
        .await
        .unwrap();

    let view = common::wait_for_view(&mut view_rx, |view| {
        view.phase == EnginePhase::Ready && view.total_spent == Decimal::from(700)
    })
    .await;

    assert_eq!(view.progress_percentage, 70);
    assert_eq!(view.remaining, Some(Decimal::from(300)));
    assert_eq!(view.category_breakdown["Groceries"], Decimal::from(700));
}

#[tokio::test]
async fn test_current_budget_is_the_most_recent_row() {
    let app = common::setup().await;
    let session = common::open_session(&app, "history").await;
    let mut view_rx = session.engine.subscribe();

    let first = session
        .engine
        .record_budget(monthly_budget(1500.0, 100.0, 1200.0))
        .await
        .unwrap();
    let second = session
        .engine
        .record_budget(monthly_budget(1500.0, 100.0, 1200.0))
        .await
        .unwrap();

    // Identical fields still produce two history rows.
    assert_ne!(first.id, second.id);

    let view = common::wait_for_view(&mut view_rx, |view| {
        view.current_budget.as_ref().map(|b| b.id) == Some(second.id)
    })
    .await;
    assert_eq!(view.current_budget.unwrap().id, second.id);

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let history = session.budget_service.get_budgets_since(epoch).unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_subscriptions_are_isolated_per_user() {
    let app = common::setup().await;
    let session_a = common::open_session(&app, "alice").await;
    let session_b = common::open_session(&app, "bob").await;

    let mut view_a = session_a.engine.subscribe();

    session_b
        .engine
        .record_budget(monthly_budget(9000.0, 10.0, 8000.0))
        .await
        .unwrap();
    session_b
        .expense_service
        .record_expense(expense("Bob's dinner", "Dining", 120.0, 6))
        .await
        .unwrap();

    // A's engine reaches Ready on its own (empty) data.
    let view = common::wait_for_view(&mut view_a, |view| view.phase == EnginePhase::Ready).await;
    assert_eq!(view.total_spent, Decimal::ZERO);
    assert!(view.current_budget.is_none());
    assert!(view.category_breakdown.is_empty());

    // And stays untouched by further writes from B.
    session_b
        .expense_service
        .record_expense(expense("Bob again", "Dining", 80.0, 7))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let view = session_a.engine.current_view();
    assert_eq!(view.total_spent, Decimal::ZERO);
    assert!(view.category_breakdown.is_empty());

    // B meanwhile sees only B's data.
    let mut view_b = session_b.engine.subscribe();
    let view = common::wait_for_view(&mut view_b, |view| {
        view.total_spent == Decimal::from(200)
    })
    .await;
    assert_eq!(view.category_breakdown["Dining"], Decimal::from(200));
}

#[tokio::test]
async fn test_reset_wipes_the_session_scope() {
    let app = common::setup().await;
    let session = common::open_session(&app, "reset").await;
    let mut view_rx = session.engine.subscribe();

    session
        .engine
        .record_budget(monthly_budget(500.0, 50.0, 400.0))
        .await
        .unwrap();
    session
        .expense_service
        .record_expense(expense("Coffee", "Dining", 35.5, 8))
        .await
        .unwrap();
    session
        .category_service
        .create_category("Dining".to_string(), 100.0)
        .await
        .unwrap();

    common::wait_for_view(&mut view_rx, |view| {
        view.total_spent == Decimal::from_f64(35.5).unwrap() && view.current_budget.is_some()
    })
    .await;

    session.reset().await.unwrap();

    let view = common::wait_for_view(&mut view_rx, |view| {
        view.total_spent == Decimal::ZERO && view.current_budget.is_none()
    })
    .await;
    assert!(view.category_breakdown.is_empty());
    assert!(session.category_service.get_categories().unwrap().is_empty());
}

#[tokio::test]
async fn test_session_gates() {
    let app = common::setup().await;

    // No durable session yet.
    assert!(matches!(
        app.factory.resolve_session(),
        Err(Error::Session(SessionError::NotAuthenticated))
    ));

    // Unknown user fails fast when building services.
    let ghost = SessionContext::new(424_242).unwrap();
    assert!(matches!(
        app.factory.session_services(ghost),
        Err(Error::Session(SessionError::UnknownUser(424_242)))
    ));

    // Wrong credentials do not open a session.
    let user = app.factory.register(common::new_user("gates")).await.unwrap();
    let missed = app.factory.login("user_gates", "wrong-hash").await.unwrap();
    assert!(missed.is_none());

    // The happy path persists the user id across factory reads.
    let context = app
        .factory
        .login("user_gates", "hash-gates")
        .await
        .unwrap()
        .expect("valid credentials should open a session");
    assert_eq!(context.user_id(), user.id);
    assert_eq!(app.factory.resolve_session().unwrap(), context);

    app.factory.logout().await.unwrap();
    assert!(matches!(
        app.factory.resolve_session(),
        Err(Error::Session(SessionError::NotAuthenticated))
    ));
}
