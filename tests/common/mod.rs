use std::time::Duration;

use spendloom_core::dashboard::BudgetView;
use spendloom_core::db;
use spendloom_core::session::{ServiceFactory, SessionContext, SessionServices};
use spendloom_core::users::NewUser;
use tempfile::TempDir;
use tokio::sync::watch;

pub struct TestApp {
    pub factory: ServiceFactory,
    // Keeps the database directory alive for the duration of the test.
    _data_dir: TempDir,
}

pub async fn setup() -> TestApp {
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = db::init(data_dir.path().to_str().unwrap()).expect("Failed to init database");
    let pool = db::create_pool(&db_path).expect("Failed to create pool");
    db::run_migrations(&pool).expect("Failed to run migrations");
    let writer = db::spawn_writer(pool.as_ref().clone());

    TestApp {
        factory: ServiceFactory::new(pool, writer),
        _data_dir: data_dir,
    }
}

pub fn new_user(tag: &str) -> NewUser {
    NewUser {
        full_name: format!("Test {}", tag),
        surname: "User".to_string(),
        username: format!("user_{}", tag),
        email: format!("{}@example.com", tag),
        password_hash: format!("hash-{}", tag),
    }
}

/// Registers a user and opens a session for them.
pub async fn open_session(app: &TestApp, tag: &str) -> SessionServices {
    let user = app.factory.register(new_user(tag)).await.unwrap();
    let context = SessionContext::new(user.id).unwrap();
    app.factory.session_services(context).unwrap()
}

/// Waits until the published view satisfies `pred`, or panics after a
/// generous timeout.
pub async fn wait_for_view<F>(rx: &mut watch::Receiver<BudgetView>, pred: F) -> BudgetView
where
    F: Fn(&BudgetView) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let view = rx.borrow_and_update();
                if pred(&view) {
                    return view.clone();
                }
            }
            rx.changed().await.expect("view channel closed");
        }
    })
    .await
    .expect("timed out waiting for the expected budget view")
}
