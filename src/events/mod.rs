//! Domain events module.
//!
//! Provides the domain event types, the broadcast bus the store publishes
//! on after successful committed mutations, and the observer helper that
//! turns a query into a live `watch` stream refreshed on every relevant
//! event.

mod bus;
mod domain_event;
mod observer;

pub use bus::EventBus;
pub use domain_event::DomainEvent;
pub use observer::observe;
