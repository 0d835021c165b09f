use log::info;
use std::sync::Arc;

use crate::budgets::{BudgetRepository, BudgetService, BudgetServiceTrait};
use crate::categories::{CategoryRepository, CategoryService, CategoryServiceTrait};
use crate::dashboard::BudgetViewEngine;
use crate::db::{DbPool, WriteHandle};
use crate::errors::{Result, SessionError};
use crate::events::{DomainEvent, EventBus};
use crate::expenses::{ExpenseRepository, ExpenseService, ExpenseServiceTrait};
use crate::schema::{budgets, categories, expenses};
use crate::session::session_store::{DbSessionStore, SessionStore};
use crate::users::{NewUser, User, UserId, UserRepository, UserService, UserServiceTrait};
use diesel::prelude::*;
use diesel::SqliteConnection;

/// The active user identity a session's components are built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    user_id: UserId,
}

impl SessionContext {
    pub fn new(user_id: UserId) -> Result<Self> {
        if user_id <= 0 {
            return Err(SessionError::InvalidUser(user_id).into());
        }
        Ok(SessionContext { user_id })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Builds repositories, services, and the aggregation engine for the
/// active session, so no call site can operate on another user's data.
pub struct ServiceFactory {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    bus: EventBus,
    session_store: Arc<dyn SessionStore>,
    user_service: Arc<dyn UserServiceTrait>,
}

impl ServiceFactory {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        let bus = EventBus::new();
        let user_repository = Arc::new(UserRepository::new(
            pool.clone(),
            writer.clone(),
            bus.clone(),
        ));
        let user_service = Arc::new(UserService::new(user_repository));
        let session_store = Arc::new(DbSessionStore::new(pool.clone(), writer.clone()));

        ServiceFactory {
            pool,
            writer,
            bus,
            session_store,
            user_service,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn user_service(&self) -> Arc<dyn UserServiceTrait> {
        self.user_service.clone()
    }

    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        self.session_store.clone()
    }

    pub async fn register(&self, new_user: NewUser) -> Result<User> {
        self.user_service.register(new_user).await
    }

    /// Authenticates and, on success, becomes the single writer of the
    /// durable session state. `None` means the credentials matched no
    /// user.
    pub async fn login(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<SessionContext>> {
        match self.user_service.authenticate(username, password_hash)? {
            Some(user) => {
                self.session_store.set_current_user(user.id).await?;
                info!("User {} logged in", user.id);
                Ok(Some(SessionContext::new(user.id)?))
            }
            None => Ok(None),
        }
    }

    pub async fn logout(&self) -> Result<()> {
        self.session_store.clear().await
    }

    /// Reads the durable session state. Absent or invalid state is a
    /// session error; callers redirect to the login flow.
    pub fn resolve_session(&self) -> Result<SessionContext> {
        match self.session_store.current_user_id()? {
            Some(user_id) => SessionContext::new(user_id),
            None => Err(SessionError::NotAuthenticated.into()),
        }
    }

    /// Builds the per-session service set. Fails fast when the context's
    /// user row does not exist. Must run inside a Tokio runtime: the
    /// engine and the subscription observers spawn worker tasks.
    pub fn session_services(&self, context: SessionContext) -> Result<SessionServices> {
        let user_id = context.user_id();
        if self.user_service.get_user(user_id)?.is_none() {
            return Err(SessionError::UnknownUser(user_id).into());
        }

        let budget_repository = Arc::new(BudgetRepository::for_user(
            self.pool.clone(),
            self.writer.clone(),
            self.bus.clone(),
            user_id,
        ));
        let category_repository = Arc::new(CategoryRepository::for_user(
            self.pool.clone(),
            self.writer.clone(),
            self.bus.clone(),
            user_id,
        ));
        let expense_repository = Arc::new(ExpenseRepository::for_user(
            self.pool.clone(),
            self.writer.clone(),
            self.bus.clone(),
            user_id,
        ));

        let budget_service = Arc::new(BudgetService::new(budget_repository.clone()));
        let category_service = Arc::new(CategoryService::new(category_repository.clone()));
        let expense_service = Arc::new(ExpenseService::new(
            expense_repository.clone(),
            category_repository.clone(),
        ));

        let engine = Arc::new(BudgetViewEngine::new(
            user_id,
            budget_repository,
            expense_repository,
        )?);

        Ok(SessionServices {
            context,
            budget_service,
            category_service,
            expense_service,
            engine,
            writer: self.writer.clone(),
            bus: self.bus.clone(),
        })
    }
}

/// One user session's services and engine.
pub struct SessionServices {
    context: SessionContext,
    pub budget_service: Arc<dyn BudgetServiceTrait>,
    pub category_service: Arc<dyn CategoryServiceTrait>,
    pub expense_service: Arc<dyn ExpenseServiceTrait>,
    pub engine: Arc<BudgetViewEngine>,
    writer: WriteHandle,
    bus: EventBus,
}

impl SessionServices {
    pub fn context(&self) -> SessionContext {
        self.context
    }

    /// The explicit per-user wipe: budgets, categories, and expenses go
    /// in one writer transaction, so the reset is all-or-nothing.
    pub async fn reset(&self) -> Result<()> {
        let user_id = self.context.user_id();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(expenses::table.filter(expenses::user_id.eq(user_id)))
                    .execute(conn)?;
                diesel::delete(categories::table.filter(categories::user_id.eq(user_id)))
                    .execute(conn)?;
                diesel::delete(budgets::table.filter(budgets::user_id.eq(user_id)))
                    .execute(conn)?;
                Ok(())
            })
            .await?;

        info!("Reset all data for user {}", user_id);
        self.bus.publish(DomainEvent::expenses_changed(user_id));
        self.bus.publish(DomainEvent::categories_changed(user_id));
        self.bus.publish(DomainEvent::budgets_changed(user_id));
        Ok(())
    }
}
