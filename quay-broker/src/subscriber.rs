//! The subscriber contract.

use crate::error::BrokerResult;
use async_trait::async_trait;
use quay_types::EventParams;

/// Consumes events from one or more topics.
///
/// The broker runs one consumer task per (subscriber, topic) pair; a
/// subscriber may therefore see concurrent `on_event` calls for different
/// topics.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Identifies the subscriber in logs and task names.
    fn id(&self) -> &str;

    /// Topics this subscriber wants events from.
    fn topics(&self) -> Vec<String>;

    /// Handles one event. An error requeues the event for redelivery.
    async fn on_event(&self, event: EventParams) -> BrokerResult<()>;
}
