use std::sync::Arc;

use thiserror::Error;

use common_pubsub::{PubSubClient, PubSubError};
use common_types::{ContentEntity, Flag};

pub const FLAG_CHANNEL: &str = "featureflag";
pub const CONTENT_CHANNEL: &str = "contenthub";

// total attempts per record, not retries on top of the first try
const MAX_ATTEMPTS: u32 = 3;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to serialize record for publishing: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("publish failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: PubSubError,
    },
}

/// Announces committed flag/content mutations to subscribed clients.
///
/// Publishing happens after the record is already persisted; a failure here
/// surfaces to the write path but never rolls the record back. Clients that
/// miss the event converge on their next polling refresh.
pub struct ChangeNotifier {
    client: Arc<dyn PubSubClient + Send + Sync>,
}

impl ChangeNotifier {
    pub fn new(client: Arc<dyn PubSubClient + Send + Sync>) -> ChangeNotifier {
        ChangeNotifier { client }
    }

    pub async fn publish_flag(&self, flag: &Flag) -> Result<(), PublishError> {
        self.publish(FLAG_CHANNEL, serde_json::to_vec(flag)?).await
    }

    pub async fn publish_content(&self, content: &ContentEntity) -> Result<(), PublishError> {
        self.publish(CONTENT_CHANNEL, serde_json::to_vec(content)?)
            .await
    }

    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.client.publish(channel, &payload).await {
                Ok(()) => {
                    tracing::debug!(channel, "published change event");
                    return Ok(());
                }
                Err(source) if attempt >= MAX_ATTEMPTS => {
                    tracing::error!(channel, attempts = attempt, error = %source, "giving up on change event");
                    return Err(PublishError::Exhausted {
                        attempts: attempt,
                        source,
                    });
                }
                Err(err) => {
                    tracing::warn!(channel, attempt, error = %err, "publish failed, retrying");
                }
            }
        }
    }
}
