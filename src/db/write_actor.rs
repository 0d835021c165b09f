//! Single-writer actor for the SQLite store.
//!
//! All mutations funnel through one dedicated connection so writes are
//! serialized in arrival order and each job runs inside an immediate
//! transaction.

use std::any::Any;

use diesel::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::{Error, Result};

// A job takes the writer's connection and returns a type-erased result.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    #[allow(clippy::type_complexity)]
    tx: mpsc::Sender<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>,
}

impl WriteHandle {
    /// Executes a database job on the writer's dedicated connection and
    /// returns its result once the transaction has committed.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("Writer actor's receiving channel was closed, indicating the actor stopped.");

        ret_rx
            .await
            .expect("Writer actor dropped the reply sender without sending a result.")
            .map(|boxed: Box<dyn Any + Send + 'static>| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("Failed to downcast writer actor result."))
            })
    }
}

/// Spawns the writer task. It owns one connection from the pool and
/// processes jobs serially until every `WriteHandle` is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>(1024);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("Failed to get a connection from the pool for the writer actor.");

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> =
                conn.immediate_transaction::<_, Error, _>(|c| job(c));

            // Receiver may have been dropped (request cancelled); that is fine.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
