//! Query observers.
//!
//! An observer turns a one-shot query into a live stream: it publishes
//! the current result promptly after subscription and re-runs the query
//! after every committed write that could change it. Results are
//! delivered through a `watch` channel, so a slow subscriber only ever
//! sees the most recent snapshot.

use log::{debug, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;

use super::{DomainEvent, EventBus};
use crate::errors::Result;

/// Spawns an observer task for `query`, refreshed whenever `relevant`
/// matches a published event.
///
/// `initial` seeds the channel until the first query result lands. On a
/// transient store failure the observer keeps its last-known-good value;
/// the task stops once every receiver has been dropped.
pub fn observe<T, Q, F>(
    bus: &EventBus,
    initial: T,
    relevant: F,
    query: Q,
) -> watch::Receiver<T>
where
    T: Clone + Send + Sync + 'static,
    Q: Fn() -> Result<T> + Send + 'static,
    F: Fn(&DomainEvent) -> bool + Send + 'static,
{
    let (tx, rx) = watch::channel(initial);
    let mut events = bus.subscribe();

    tokio::spawn(async move {
        // Initial emission: the current result, as soon as the store answers.
        run_query(&tx, &query);

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                received = events.recv() => match received {
                    Ok(event) => {
                        if relevant(&event) {
                            run_query(&tx, &query);
                        }
                    }
                    // Missed events are just a stale snapshot; requery.
                    Err(RecvError::Lagged(missed)) => {
                        debug!("Observer lagged {} events; refreshing", missed);
                        run_query(&tx, &query);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    });

    rx
}

fn run_query<T, Q>(tx: &watch::Sender<T>, query: &Q)
where
    T: Clone + Send + Sync + 'static,
    Q: Fn() -> Result<T>,
{
    match query() {
        Ok(value) => {
            let _ = tx.send(value);
        }
        Err(e) if e.is_transient() => {
            warn!("Store unavailable during refresh, keeping last value: {}", e);
        }
        Err(e) => {
            warn!("Observer query failed, keeping last value: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_observer_emits_initial_and_refreshed_values() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicI32::new(0));
        let query_counter = counter.clone();

        let mut rx = observe(
            &bus,
            -1,
            |event| event.user_id() == 1,
            move || Ok(query_counter.fetch_add(1, Ordering::SeqCst)),
        );

        // Initial emission.
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 0);

        // Relevant event triggers a refresh.
        bus.publish(DomainEvent::expenses_changed(1));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);

        // Irrelevant event does not.
        bus.publish(DomainEvent::expenses_changed(2));
        bus.publish(DomainEvent::expenses_changed(1));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 2);
    }
}
