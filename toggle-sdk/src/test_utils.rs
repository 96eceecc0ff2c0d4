use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::json;
use tokio::sync::mpsc;

use common_types::{
    BalancerStrategy, ContentEntity, Flag, Payload, RolloutStrategy, SessionStrategyEntry,
    SessionStrategyList, WeightedVariant,
};

use crate::error::TransportError;
use crate::record::SyncRecord;
use crate::transport::{RecordStream, SyncTransport};

pub fn random_string(prefix: &str, length: usize) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    format!("{}{}", prefix, suffix)
}

pub fn percent_flag(name: &str, percent: f64, call_count: u32) -> Flag {
    Flag::new(
        name.to_string(),
        true,
        RolloutStrategy {
            enabled: true,
            percent,
            call_count,
            ..Default::default()
        },
    )
}

pub fn content_with_sessions(key: &str, entries: &[(&str, &str)]) -> ContentEntity {
    ContentEntity::new(
        key.to_string(),
        key.to_string(),
        String::new(),
        true,
        SessionStrategyList(
            entries
                .iter()
                .map(|(session_id, label)| SessionStrategyEntry {
                    session_id: session_id.to_string(),
                    response: Payload::from(json!(label)),
                })
                .collect(),
        ),
        BalancerStrategy::default(),
    )
}

pub fn content_with_balancer(key: &str, variants: &[(u32, &str)]) -> ContentEntity {
    ContentEntity::new(
        key.to_string(),
        key.to_string(),
        String::new(),
        true,
        SessionStrategyList::default(),
        BalancerStrategy(
            variants
                .iter()
                .map(|(weight, label)| WeightedVariant {
                    weight: *weight,
                    response: Payload::from(json!(label)),
                    call_count: 0,
                })
                .collect(),
        ),
    )
}

/// Scriptable transport: serves a mutable snapshot for bulk fetches and a
/// hand-fed channel for the event stream.
pub struct MockTransport<R> {
    snapshot: Mutex<Vec<R>>,
    failures_left: Mutex<usize>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<Result<R, TransportError>>>>,
    events_tx: mpsc::UnboundedSender<Result<R, TransportError>>,
}

impl<R: SyncRecord> MockTransport<R> {
    pub fn new(initial: Vec<R>) -> Arc<MockTransport<R>> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Arc::new(MockTransport {
            snapshot: Mutex::new(initial),
            failures_left: Mutex::new(0),
            events_rx: Mutex::new(Some(events_rx)),
            events_tx,
        })
    }

    /// Replace what the next bulk fetch returns.
    pub fn set_snapshot(&self, records: Vec<R>) {
        *self.snapshot.lock().unwrap() = records;
    }

    /// Make the next `count` fetches fail with a server error.
    pub fn fail_fetches(&self, count: usize) {
        *self.failures_left.lock().unwrap() = count;
    }

    /// Emit a record on the subscribed event stream.
    pub fn push(&self, record: R) {
        self.events_tx
            .send(Ok(record))
            .expect("event stream receiver dropped");
    }
}

#[async_trait]
impl<R: SyncRecord> SyncTransport<R> for MockTransport<R> {
    async fn fetch_all(&self) -> Result<Vec<R>, TransportError> {
        {
            let mut failures_left = self.failures_left.lock().unwrap();
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(TransportError::Status(
                    reqwest::StatusCode::SERVICE_UNAVAILABLE,
                ));
            }
        }

        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn subscribe(&self) -> Result<RecordStream<R>, TransportError> {
        let rx = self
            .events_rx
            .lock()
            .unwrap()
            .take()
            .expect("subscribe called twice on mock transport");

        Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })))
    }
}
