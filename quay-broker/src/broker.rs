//! The in-memory broker.

use crate::config::BrokerConfig;
use crate::error::BrokerResult;
use crate::subscriber::EventSubscriber;
use quay_types::EventParams;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{error, info};

const GITHUB_TOPIC: &str = "github";
const GITHUB_EVENT_HEADER: &str = "x-github-event";

type TopicQueues = Arc<Mutex<HashMap<String, Vec<EventParams>>>>;

/// Topic broker holding every queue in process memory.
///
/// Queues are unbounded and insertion-ordered; consumers take from the end,
/// so the newest event is delivered first. A failed delivery pushes the
/// event back onto the end of its queue — it is never dropped, and a
/// permanently failing handler will re-consume the same event forever.
pub struct InMemoryEventBroker {
    config: BrokerConfig,
    events: TopicQueues,
    running: Arc<AtomicBool>,
    consumers: Mutex<Vec<JoinHandle<()>>>,
}

impl InMemoryEventBroker {
    /// Creates a broker after validating the configuration.
    pub fn new(config: BrokerConfig) -> BrokerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            events: Arc::new(Mutex::new(HashMap::new())),
            running: Arc::new(AtomicBool::new(true)),
            consumers: Mutex::new(Vec::new()),
        })
    }

    /// Whether consumer tasks are (still) allowed to run.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Enqueues an event onto its topic.
    ///
    /// Events published to the `github` topic are routed into a
    /// `github.{event}` sub-topic based on the `x-github-event` metadata
    /// header, so subscribers can pick individual webhook event types.
    pub async fn publish(&self, mut params: EventParams) {
        if params.topic == GITHUB_TOPIC {
            if let Some(event_type) = params.metadata.get(GITHUB_EVENT_HEADER) {
                params.topic = format!("{GITHUB_TOPIC}.{event_type}");
            }
        }

        let mut queues = self.events.lock().await;
        queues
            .entry(params.topic.clone())
            .or_default()
            .push(params);
    }

    /// Number of events currently queued on a topic.
    pub async fn queued(&self, topic: &str) -> usize {
        self.events
            .lock()
            .await
            .get(topic)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Registers a subscriber, spawning one consumer task per topic.
    ///
    /// Consumers poll their queue, deliver one event per iteration under
    /// the consume timeout, and sleep `poll_wait` when the queue is empty.
    /// They keep running until [`stop`](Self::stop).
    pub async fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        for topic in subscriber.topics() {
            info!("subscriber {} attached to topic {topic}", subscriber.id());

            let events = Arc::clone(&self.events);
            let running = Arc::clone(&self.running);
            let subscriber = Arc::clone(&subscriber);
            let config = self.config.clone();

            let handle = tokio::spawn(async move {
                Self::consume_loop(topic, events, running, subscriber, config).await;
            });
            self.consumers.lock().await.push(handle);
        }
    }

    /// Stops every consumer and waits for them to exit.
    ///
    /// Consumers notice the flag at their next iteration, so this returns
    /// within roughly one `poll_wait`.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let mut consumers = self.consumers.lock().await;
        for handle in consumers.drain(..) {
            let _ = handle.await;
        }
        info!("event broker stopped");
    }

    async fn consume_loop(
        topic: String,
        events: TopicQueues,
        running: Arc<AtomicBool>,
        subscriber: Arc<dyn EventSubscriber>,
        config: BrokerConfig,
    ) {
        while running.load(Ordering::SeqCst) {
            // Take the newest event while holding the lock, then release it
            // before the handler runs: delivery must not block publishers.
            let next = {
                let mut queues = events.lock().await;
                queues.get_mut(&topic).and_then(Vec::pop)
            };

            match next {
                Some(mut event) => {
                    info!(
                        "topic={topic} contains message for {}",
                        subscriber.id()
                    );
                    event.topic = topic.clone();

                    let delivery =
                        timeout(config.consume_timeout, subscriber.on_event(event.clone())).await;
                    match delivery {
                        Ok(Ok(())) => {}
                        Ok(Err(err)) => {
                            events
                                .lock()
                                .await
                                .entry(topic.clone())
                                .or_default()
                                .push(event);
                            error!("failed to consume message on {topic}: {err}");
                        }
                        Err(_) => {
                            events
                                .lock()
                                .await
                                .entry(topic.clone())
                                .or_default()
                                .push(event);
                            error!(
                                "subscriber {} timed out on {topic} after {:?}",
                                subscriber.id(),
                                config.consume_timeout
                            );
                        }
                    }
                }
                None => {
                    sleep(config.poll_wait).await;
                }
            }
        }
    }
}
