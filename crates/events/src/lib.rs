//! Juris event bus and notification infrastructure.
//!
//! This crate provides the building blocks for the platform-wide event
//! system:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] — the canonical domain event envelope.
//! - [`EventPersistence`] — background service that durably writes every
//!   event to the `events` table and fans import outcomes out to the
//!   initiating user as notifications.

pub mod bus;
pub mod persistence;

pub use bus::{event_types, EventBus, PlatformEvent};
pub use persistence::EventPersistence;
