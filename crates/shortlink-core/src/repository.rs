use crate::error::StorageError;
use crate::fingerprint::Fingerprint;
use crate::shortcode::ShortCode;
use crate::shortener::ExpirationPolicy;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The detail record attached to a short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlDetail {
    /// The long URL the code points to.
    pub url: String,
    /// When the short code was allocated.
    pub created_at: Timestamp,
    /// The TTL the code was created with; `0` means it never expires.
    pub expiration_in_minutes: u64,
}

/// Outcome of a dedup index lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupLookup {
    /// No entry for the fingerprint.
    Absent,
    /// An entry exists but holds no usable code, e.g. the `{}` marker.
    Degenerate,
    /// The code previously allocated for the same URL.
    Present(ShortCode),
}

/// Everything written for one newly allocated short code.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: ShortCode,
    pub fingerprint: Fingerprint,
    pub detail: UrlDetail,
    pub expiration: ExpirationPolicy,
}

/// Produces strictly increasing identifiers, shared by every engine instance
/// using the same store.
#[async_trait]
pub trait IdAllocator: Send + Sync + 'static {
    /// Atomically increments the counter and returns the new value.
    /// The first value handed out is `1`.
    async fn next_id(&self) -> Result<u64>;
}

/// Maps URL fingerprints to previously allocated short codes.
#[async_trait]
pub trait DedupIndex: Send + Sync + 'static {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<DedupLookup>;

    async fn put_dedup(
        &self,
        fingerprint: &Fingerprint,
        code: &ShortCode,
        expiration: &ExpirationPolicy,
    ) -> Result<()>;
}

/// The canonical code → URL and code → detail relations.
#[async_trait]
pub trait MappingStore: Send + Sync + 'static {
    async fn put_mapping(
        &self,
        code: &ShortCode,
        url: &str,
        expiration: &ExpirationPolicy,
    ) -> Result<()>;

    /// Returns `Err(NotFound)` if the code is absent or expired.
    async fn get_mapping(&self, code: &ShortCode) -> Result<String>;

    async fn put_detail(
        &self,
        code: &ShortCode,
        detail: &UrlDetail,
        expiration: &ExpirationPolicy,
    ) -> Result<()>;

    /// Returns `Err(NotFound)` if the code is absent or expired.
    async fn get_detail(&self, code: &ShortCode) -> Result<UrlDetail>;
}

/// A store offering everything the shortening engine needs.
#[async_trait]
pub trait LinkStore: IdAllocator + DedupIndex + MappingStore {
    /// Removes whatever part of `link` was written.
    ///
    /// The dedup entry is only removed while it still points at `link.code`.
    /// Missing keys are not an error.
    async fn discard(&self, link: &NewLink) -> Result<()>;

    /// Writes the mapping, detail and dedup entries of a new link.
    ///
    /// On failure, whatever was written is discarded on a best-effort basis
    /// and the first error is returned.
    async fn put_link(&self, link: &NewLink) -> Result<()> {
        let written = async {
            self.put_mapping(&link.code, &link.detail.url, &link.expiration)
                .await?;
            self.put_detail(&link.code, &link.detail, &link.expiration)
                .await?;
            self.put_dedup(&link.fingerprint, &link.code, &link.expiration)
                .await
        }
        .await;

        if let Err(err) = written {
            debug!(code = %link.code, error = %err, "partial link write, discarding");
            if let Err(rollback) = self.discard(link).await {
                warn!(code = %link.code, error = %rollback, "failed to discard partial link");
            }
            return Err(err);
        }

        Ok(())
    }
}
