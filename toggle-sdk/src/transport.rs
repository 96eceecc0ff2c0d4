use std::collections::VecDeque;
use std::marker::PhantomData;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::header;

use crate::error::TransportError;
use crate::record::SyncRecord;

pub type RecordStream<R> = Pin<Box<dyn Stream<Item = Result<R, TransportError>> + Send>>;

/// Which server collection a transport talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    FeatureFlag,
    ContentHub,
}

impl Resource {
    fn collection(&self) -> &'static str {
        match self {
            Resource::FeatureFlag => "featureflags",
            Resource::ContentHub => "contenthubs",
        }
    }

    fn channel(&self) -> &'static str {
        match self {
            Resource::FeatureFlag => "featureflag",
            Resource::ContentHub => "contenthub",
        }
    }
}

/// Fetch-and-subscribe boundary between the sync engine and the server.
#[async_trait]
pub trait SyncTransport<R>: Send + Sync {
    /// One full snapshot of the authoritative record set.
    async fn fetch_all(&self) -> Result<Vec<R>, TransportError>;

    /// A long-lived stream of whole updated records as they are committed.
    /// The stream ending is not an error; re-establishing it is the
    /// caller's concern.
    async fn subscribe(&self) -> Result<RecordStream<R>, TransportError>;
}

pub struct HttpTransport<R> {
    base: String,
    resource: Resource,
    client: reqwest::Client,
    request_timeout: Duration,
    _record: PhantomData<fn() -> R>,
}

impl<R> HttpTransport<R> {
    pub fn new(
        base: &str,
        resource: Resource,
        request_timeout: Duration,
    ) -> Result<HttpTransport<R>, TransportError> {
        // no default timeout on the client itself: the SSE connection must
        // stay open indefinitely, so the timeout is applied per fetch
        let client = reqwest::Client::builder().build()?;

        Ok(HttpTransport {
            base: base.trim_end_matches('/').to_string(),
            resource,
            client,
            request_timeout,
            _record: PhantomData,
        })
    }
}

#[async_trait]
impl<R: SyncRecord> SyncTransport<R> for HttpTransport<R> {
    async fn fetch_all(&self) -> Result<Vec<R>, TransportError> {
        let url = format!("{}/{}", self.base, self.resource.collection());

        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    async fn subscribe(&self) -> Result<RecordStream<R>, TransportError> {
        let url = format!("{}/events/{}", self.base, self.resource.channel());

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }

        Ok(Box::pin(decode_event_stream(response.bytes_stream())))
    }
}

/// Turn a raw server-sent-event byte stream into decoded records.
///
/// Only `data:` lines carry records; comments, event names and blank
/// keep-alive lines are dropped. A record split across chunk boundaries is
/// buffered until its terminating newline arrives.
pub fn decode_event_stream<R, S>(source: S) -> impl Stream<Item = Result<R, TransportError>>
where
    R: SyncRecord,
    S: Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
{
    let state = (Box::pin(source), String::new(), VecDeque::new());

    futures::stream::unfold(state, |(mut source, mut buffer, mut ready)| async move {
        loop {
            if let Some(item) = ready.pop_front() {
                return Some((item, (source, buffer, ready)));
            }

            match source.next().await {
                Some(Ok(chunk)) => {
                    buffer.push_str(&String::from_utf8_lossy(&chunk));

                    while let Some(newline) = buffer.find('\n') {
                        let line = buffer[..newline].trim().to_string();
                        buffer.drain(..=newline);

                        if let Some(data) = line.strip_prefix("data: ") {
                            match serde_json::from_str::<R>(data) {
                                Ok(record) => ready.push_back(Ok(record)),
                                Err(err) => ready.push_back(Err(TransportError::Decode(err))),
                            }
                        }
                    }
                }
                Some(Err(err)) => {
                    return Some((
                        Err(TransportError::Request(err)),
                        (source, buffer, ready),
                    ))
                }
                None => return None,
            }
        }
    })
}
