//! In-memory topic broker for Quay events.
//!
//! Queues events per topic and redelivers them to subscribers through
//! dedicated consumer tasks. Delivery is at-least-once with
//! retry-by-requeue: a failing handler puts the event back on the queue and
//! the consumer picks it up again on a later iteration.
//!
//! Queues are owned by the broker instance — construct one at service start
//! and share it by reference. Nothing here is process-global.

mod broker;
mod config;
mod error;
mod subscriber;

pub use broker::InMemoryEventBroker;
pub use config::BrokerConfig;
pub use error::{BrokerError, BrokerResult};
pub use subscriber::EventSubscriber;
