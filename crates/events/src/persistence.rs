//! Durable event persistence and initiator notification.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes every received [`PlatformEvent`] to the
//! `events` table. Import outcome events additionally produce an in-app
//! notification for the user who started the import. It runs as a
//! long-lived background task and shuts down gracefully when the bus
//! sender is dropped.

use juris_core::types::DbId;
use juris_db::repositories::{EventRepo, NotificationRepo};
use juris_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::{event_types, PlatformEvent};

/// Notification channel written for import outcomes.
const CHANNEL_IN_APP: &str = "in_app";

/// Background service that persists platform events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and persists
    /// every event it receives. The loop exits when the channel is closed
    /// (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the `events` table and, for import
    /// outcomes, notify the initiating user.
    async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<DbId, sqlx::Error> {
        let event_id = EventRepo::insert(
            pool,
            &event.event_type,
            event.tenant_id,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            event.actor_user_id,
            &event.payload,
        )
        .await?;

        if let Some(recipient) = Self::initiator_recipient(event) {
            NotificationRepo::create(pool, event_id, recipient, CHANNEL_IN_APP).await?;
        }

        Ok(event_id)
    }

    /// Events that report an import outcome notify the user who started
    /// the import (the event actor).
    fn initiator_recipient(event: &PlatformEvent) -> Option<DbId> {
        match event.event_type.as_str() {
            event_types::IMPORT_COMPLETED | event_types::IMPORT_FAILED => event.actor_user_id,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_outcome_events_notify_the_actor() {
        let event = PlatformEvent::new(event_types::IMPORT_COMPLETED).with_actor(11);
        assert_eq!(EventPersistence::initiator_recipient(&event), Some(11));

        let event = PlatformEvent::new(event_types::IMPORT_FAILED).with_actor(12);
        assert_eq!(EventPersistence::initiator_recipient(&event), Some(12));
    }

    #[test]
    fn other_events_notify_nobody() {
        let event = PlatformEvent::new("case.updated").with_actor(11);
        assert_eq!(EventPersistence::initiator_recipient(&event), None);
    }

    #[test]
    fn import_outcome_without_actor_notifies_nobody() {
        let event = PlatformEvent::new(event_types::IMPORT_COMPLETED);
        assert_eq!(EventPersistence::initiator_recipient(&event), None);
    }
}
