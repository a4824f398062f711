use async_trait::async_trait;
use shortlink_core::{
    Clock, DedupLookup, ExpirationPolicy, Fingerprint, LinkStore, NewLink, ShortCode, Shortener,
    ShortenerError, SystemClock, UrlDetail,
};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `LinkStore` and handles:
/// - Deduplication of repeated URLs through the fingerprint index
/// - Identifier allocation and short code encoding
/// - Writing the mapping, detail and dedup entries as one unit
///
/// The service keeps no mutable state of its own. Any number of instances
/// may share one store; coordination happens through the store's atomic
/// counter.
#[derive(Debug)]
pub struct ShortenerService<S, C = SystemClock> {
    store: Arc<S>,
    clock: C,
}

impl<S: LinkStore> ShortenerService<S> {
    /// Creates a new `ShortenerService` stamping details with the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: LinkStore, C: Clock> ShortenerService<S, C> {
    /// Creates a new `ShortenerService` with a custom clock for `created_at`.
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store: Arc::new(store),
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.trim().is_empty() {
            return Err(ShortenerError::InvalidInput("url cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Strings that can never be a short code are reported as unknown
    /// without a store round trip.
    fn parse_code(code: &str) -> Result<ShortCode, ShortenerError> {
        ShortCode::new(code).map_err(|e| {
            trace!(error = %e, "rejecting malformed short code");
            ShortenerError::unknown_short_url()
        })
    }

    async fn allocate(
        &self,
        long_url: &str,
        fingerprint: Fingerprint,
        expiration: ExpirationPolicy,
    ) -> Result<ShortCode, ShortenerError> {
        let id = self.store.next_id().await?;
        let code = ShortCode::from_id(id);

        let link = NewLink {
            code: code.clone(),
            fingerprint,
            detail: UrlDetail {
                url: long_url.to_string(),
                created_at: self.clock.now(),
                expiration_in_minutes: expiration.minutes(),
            },
            expiration,
        };
        self.store.put_link(&link).await?;

        debug!(code = %code, id, "allocated short code");
        Ok(code)
    }
}

impl<S, C: Clone> Clone for ShortenerService<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: self.clock.clone(),
        }
    }
}

#[async_trait]
impl<S: LinkStore, C: Clock> Shortener for ShortenerService<S, C> {
    async fn shorten(&self, long_url: &str, ttl_minutes: i64) -> Result<ShortCode, ShortenerError> {
        Self::validate_url(long_url)?;
        let expiration = ExpirationPolicy::from_minutes(ttl_minutes)?;
        let fingerprint = Fingerprint::of(long_url);

        match self.store.lookup(&fingerprint).await? {
            DedupLookup::Present(code) => {
                debug!(code = %code, fingerprint = %fingerprint, "dedup hit");
                return Ok(code);
            }
            DedupLookup::Degenerate => {
                warn!(fingerprint = %fingerprint, "ignoring degenerate dedup entry");
            }
            DedupLookup::Absent => {
                debug!(fingerprint = %fingerprint, "dedup miss");
            }
        }

        self.allocate(long_url, fingerprint, expiration).await
    }

    async fn unshorten(&self, code: &str) -> Result<String, ShortenerError> {
        let code = Self::parse_code(code)?;
        Ok(self.store.get_mapping(&code).await?)
    }

    async fn short_link_info(&self, code: &str) -> Result<UrlDetail, ShortenerError> {
        let code = Self::parse_code(code)?;
        Ok(self.store.get_detail(&code).await?)
    }
}
