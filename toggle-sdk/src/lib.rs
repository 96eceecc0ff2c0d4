pub mod client;
pub mod config;
pub mod error;
pub mod record;
pub mod sync;
pub mod test_utils;
pub mod transport;

use std::sync::Arc;

use common_types::{ContentEntity, Flag};

pub use client::{ContentClient, FlagsClient};
pub use config::Config;
pub use error::{FlagsError, SyncError, TransportError};
pub use record::SyncRecord;
pub use sync::{SyncEngine, SyncHandle};
pub use transport::{HttpTransport, Resource, SyncTransport};

/// Bootstrap a flag cache against `config.host` and keep it synced until
/// the returned handle is stopped.
pub async fn start_flags(config: &Config) -> Result<(FlagsClient, SyncHandle<Flag>), SyncError> {
    let transport = HttpTransport::new(
        &config.host,
        Resource::FeatureFlag,
        config.request_timeout(),
    )
    .map_err(SyncError::Bootstrap)?;

    let handle = SyncEngine::new(Arc::new(transport), config.refresh_interval())
        .start()
        .await?;
    let client = FlagsClient::new(handle.cache());

    Ok((client, handle))
}

/// Bootstrap a content-hub cache against `config.host` and keep it synced
/// until the returned handle is stopped.
pub async fn start_content(
    config: &Config,
) -> Result<(ContentClient, SyncHandle<ContentEntity>), SyncError> {
    let transport = HttpTransport::new(
        &config.host,
        Resource::ContentHub,
        config.request_timeout(),
    )
    .map_err(SyncError::Bootstrap)?;

    let handle = SyncEngine::new(Arc::new(transport), config.refresh_interval())
        .start()
        .await?;
    let client = ContentClient::new(handle.cache());

    Ok((client, handle))
}
