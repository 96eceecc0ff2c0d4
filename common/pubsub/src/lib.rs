use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::time::timeout;

// publishes are fire-and-forget from the broker's point of view; anything
// slower than this is treated as a transport failure
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Namespace applied to every channel so unrelated broker traffic never
/// collides with change events.
pub const CHANNEL_PREFIX: &str = "events.fanout";

pub fn channel_name(channel: &str) -> String {
    format!("{CHANNEL_PREFIX}.{channel}")
}

#[derive(Error, Debug)]
pub enum PubSubError {
    #[error("publish timed out")]
    Timeout,
    #[error("pubsub transport unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}

/// The opaque publish half of the change-event channel.
#[async_trait]
pub trait PubSubClient {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<(), PubSubError>;
}

pub struct RedisPubSubClient {
    client: redis::Client,
}

impl RedisPubSubClient {
    pub fn new(addr: String) -> Result<RedisPubSubClient, PubSubError> {
        let client = redis::Client::open(addr)?;

        Ok(RedisPubSubClient { client })
    }
}

#[async_trait]
impl PubSubClient for RedisPubSubClient {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<(), PubSubError> {
        let mut conn = self.client.get_async_connection().await?;

        let publish = conn.publish::<String, &[u8], i64>(channel_name(channel), payload);
        let _receivers = timeout(PUBLISH_TIMEOUT, publish)
            .await
            .map_err(|_| PubSubError::Timeout)??;

        Ok(())
    }
}

/// In-memory stand-in for tests: records every publish and can be told to
/// fail the first N attempts.
#[derive(Clone, Default)]
pub struct MockPubSubClient {
    published: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    failures_left: Arc<Mutex<usize>>,
}

impl MockPubSubClient {
    pub fn new() -> MockPubSubClient {
        MockPubSubClient::default()
    }

    pub fn failing(times: usize) -> MockPubSubClient {
        let client = MockPubSubClient::default();
        *client.failures_left.lock().unwrap() = times;
        client
    }

    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl PubSubClient for MockPubSubClient {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<(), PubSubError> {
        {
            let mut failures_left = self.failures_left.lock().unwrap();
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(PubSubError::Unavailable("mock failure".to_string()));
            }
        }

        self.published
            .lock()
            .unwrap()
            .push((channel_name(channel), payload.to_vec()));

        Ok(())
    }
}
