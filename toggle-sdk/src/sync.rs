use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use crate::error::SyncError;
use crate::record::SyncRecord;
use crate::transport::SyncTransport;

/// The client-side snapshot, shared between evaluation and both sync paths.
/// Guarded by one lock over the whole map; holders never await I/O while
/// holding it.
pub type SharedCache<R> = Arc<RwLock<HashMap<String, R>>>;

/// Keeps a local cache consistent with the server.
///
/// Three paths feed the cache: a blocking bootstrap fetch, a push listener
/// consuming the server's event stream (wholesale replacement, counters
/// included), and a polling refresh that diffs the full server set against
/// the cache and merges only changed entries, carrying in-flight rollout
/// counters forward when the configuration they belong to is unchanged.
pub struct SyncEngine<R: SyncRecord> {
    transport: Arc<dyn SyncTransport<R>>,
    refresh_interval: Duration,
}

impl<R: SyncRecord> SyncEngine<R> {
    pub fn new(transport: Arc<dyn SyncTransport<R>>, refresh_interval: Duration) -> SyncEngine<R> {
        SyncEngine {
            transport,
            refresh_interval,
        }
    }

    /// Bootstrap the cache, then run the push listener and the refresh
    /// timer until the returned handle is stopped.
    ///
    /// A bootstrap failure is returned synchronously and leaves nothing
    /// running; retrying is the caller's responsibility.
    pub async fn start(self) -> Result<SyncHandle<R>, SyncError> {
        let records = self
            .transport
            .fetch_all()
            .await
            .map_err(SyncError::Bootstrap)?;

        let snapshot: HashMap<String, R> = records
            .into_iter()
            .map(|record| (record.key().to_string(), record))
            .collect();
        tracing::info!(records = snapshot.len(), "cache bootstrapped");
        let cache: SharedCache<R> = Arc::new(RwLock::new(snapshot));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let push = tokio::spawn(push_loop(
            cache.clone(),
            self.transport.clone(),
            shutdown_rx.clone(),
        ));
        let pull = tokio::spawn(pull_loop(
            cache.clone(),
            self.transport.clone(),
            self.refresh_interval,
            shutdown_rx,
        ));

        Ok(SyncHandle {
            cache,
            shutdown: shutdown_tx,
            tasks: vec![push, pull],
        })
    }
}

/// Running sync session. Dropping the handle also stops both tasks (the
/// shutdown sender goes away).
pub struct SyncHandle<R> {
    cache: SharedCache<R>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl<R> SyncHandle<R> {
    pub fn cache(&self) -> SharedCache<R> {
        self.cache.clone()
    }

    /// Signal both background tasks to exit. In-flight network calls are
    /// dropped, not awaited.
    pub fn stop(&self) {
        self.shutdown.send(true).ok();
    }

    /// Wait for both tasks to finish after `stop`.
    pub async fn join(self) {
        for task in self.tasks {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "sync task aborted");
            }
        }
    }
}

async fn push_loop<R: SyncRecord>(
    cache: SharedCache<R>,
    transport: Arc<dyn SyncTransport<R>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut stream = match transport.subscribe().await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(error = %err, "failed to open event stream, relying on polling refresh");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::debug!("push listener stopped");
                return;
            }
            event = stream.next() => match event {
                Some(Ok(record)) => {
                    let key = record.key().to_string();
                    tracing::debug!(key = %key, "applying pushed update");
                    // last-write-wins, counters included: a pushed record
                    // always replaces the cached entry wholesale
                    cache.write().await.insert(key, record);
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "dropping undecodable event");
                }
                None => {
                    tracing::warn!("event stream closed, relying on polling refresh");
                    return;
                }
            }
        }
    }
}

async fn pull_loop<R: SyncRecord>(
    cache: SharedCache<R>,
    transport: Arc<dyn SyncTransport<R>>,
    refresh_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(refresh_interval);
    // the first tick completes immediately; bootstrap already covered it
    interval.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::debug!("refresh loop stopped");
                return;
            }
            _ = interval.tick() => {}
        }

        let fetched = tokio::select! {
            _ = shutdown.changed() => {
                tracing::debug!("refresh loop stopped mid-fetch");
                return;
            }
            fetched = transport.fetch_all() => fetched,
        };

        match fetched {
            Ok(server) => {
                let (changed, dropped) = reconcile(&cache, server).await;
                if changed > 0 || dropped > 0 {
                    tracing::info!(changed, dropped, "cache reconciled with server");
                }
            }
            Err(err) => {
                // keep serving the last-known-good cache
                tracing::warn!(error = %err, "refresh fetch failed, skipping cycle");
            }
        }
    }
}

/// Merge a freshly fetched server set into the cache.
///
/// Counter preservation happens here, reading the live counter under the
/// same lock evaluation increments it under, so a concurrent increment is
/// never clobbered by a value captured earlier.
pub(crate) async fn reconcile<R: SyncRecord>(cache: &SharedCache<R>, server: Vec<R>) -> (usize, usize) {
    let mut cache = cache.write().await;
    let mut next: HashMap<String, R> = HashMap::with_capacity(server.len());
    let mut changed = 0;

    for mut record in server {
        let key = record.key().to_string();
        match cache.get(&key) {
            None => {
                changed += 1;
                next.insert(key, record);
            }
            Some(live) => {
                if live.config_changed(&record) {
                    if live.counters_survive(&record) {
                        record.adopt_counters(live);
                    }
                    changed += 1;
                    next.insert(key, record);
                } else {
                    // untouched entries keep their cached copy, counters
                    // and all
                    next.insert(key, live.clone());
                }
            }
        }
    }

    // anything the server no longer returns is gone; deletions only
    // propagate through this path
    let dropped = cache.keys().filter(|k| !next.contains_key(*k)).count();
    *cache = next;

    (changed, dropped)
}
