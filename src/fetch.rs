//! Concurrent retrieval of raw collections from the remote API.

use crate::config;
use crate::error::{Result, SyncError};
use crate::models::EntityKind;
use crate::parse::RawRecord;
use std::time::Duration;
use tracing::debug;

/// All raw collections for one sync cycle, each in remote order.
#[derive(Debug, Default)]
pub struct RawCollections {
    pub films: Vec<RawRecord>,
    pub characters: Vec<RawRecord>,
    pub starships: Vec<RawRecord>,
}

/// Handle to the remote reference API.
pub struct RemoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config::FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| SyncError::RemoteUnavailable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one kind's collection. Any transport, status, or payload
    /// problem collapses into [`SyncError::RemoteUnavailable`].
    pub async fn fetch_collection(&self, kind: EntityKind) -> Result<Vec<RawRecord>> {
        let url = format!("{}/{}", self.base_url, kind.endpoint());
        debug!(%url, "fetching collection");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(kind, &e.to_string()))?;

        let records: Vec<RawRecord> = response
            .json()
            .await
            .map_err(|e| unavailable(kind, &format!("malformed payload: {e}")))?;

        debug!(kind = %kind, records = records.len(), "collection fetched");
        Ok(records)
    }

    /// Fetch all three collections concurrently, failing fast on the first
    /// error. Sibling fetches are dropped, not awaited, when one fails.
    pub async fn fetch_all(&self) -> Result<RawCollections> {
        let (films, characters, starships) = futures::try_join!(
            self.fetch_collection(EntityKind::Film),
            self.fetch_collection(EntityKind::Character),
            self.fetch_collection(EntityKind::Starship),
        )?;
        Ok(RawCollections {
            films,
            characters,
            starships,
        })
    }
}

fn unavailable(kind: EntityKind, reason: &str) -> SyncError {
    SyncError::RemoteUnavailable {
        reason: format!("{kind} collection fetch failed: {reason}"),
    }
}
