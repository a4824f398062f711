use crate::codec::{decode_detail, decode_dedup, encode_detail};
use crate::keys::KeySpace;
use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;
use shortlink_core::repository::Result;
use shortlink_core::{
    Clock, DedupIndex, DedupLookup, ExpirationPolicy, Fingerprint, IdAllocator, LinkStore,
    MappingStore, NewLink, ShortCode, StorageError, SystemClock, UrlDetail,
};
use std::sync::Arc;
use tracing::trace;

/// In-memory storage entry for a single key.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expire_at: Option<Timestamp>,
}

impl Entry {
    fn is_expired(&self, now: Timestamp) -> bool {
        self.expire_at.is_some_and(|expire_at| now >= expire_at)
    }
}

/// In-memory key-value store with per-key expiry, laid out exactly like the
/// Redis keyspace.
///
/// Clones share the same data, so one instance can back several engines in
/// a single process. Expiry is evaluated lazily against the configured
/// [`Clock`]; expired keys are dropped when they are next read.
#[derive(Debug, Clone)]
pub struct InMemoryStore<C = SystemClock> {
    storage: Arc<DashMap<String, Entry>>,
    keys: KeySpace,
    clock: C,
}

impl InMemoryStore<SystemClock> {
    /// Creates a new in-memory store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            storage: Arc::new(DashMap::new()),
            keys: KeySpace::default(),
            clock,
        }
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// Writes a raw value, bypassing the typed operations.
    pub fn set_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.storage.insert(
            key.into(),
            Entry {
                value: value.into(),
                expire_at: None,
            },
        );
    }

    /// Reads a raw value if the key is present and not expired.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        let now = self.clock.now();

        let entry = self.storage.get(key)?;
        if entry.is_expired(now) {
            drop(entry);
            self.storage.remove_if(key, |_, e| e.is_expired(now));
            return None;
        }

        Some(entry.value.clone())
    }

    /// Number of keys currently stored, expired ones included.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    fn set(&self, key: String, value: String, expiration: &ExpirationPolicy) {
        self.set_until(key, value, expiration.expire_at(self.clock.now()));
    }

    fn set_until(&self, key: String, value: String, expire_at: Option<Timestamp>) {
        self.storage.insert(key, Entry { value, expire_at });
    }
}

#[async_trait]
impl<C: Clock> IdAllocator for InMemoryStore<C> {
    async fn next_id(&self) -> Result<u64> {
        let key = self.keys.next_url_id();

        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut entry = self.storage.entry(key).or_insert_with(|| Entry {
            value: "0".to_string(),
            expire_at: None,
        });

        let current: u64 = entry.value.parse().map_err(|_| {
            StorageError::Operation(format!("counter value is not an integer: '{}'", entry.value))
        })?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| StorageError::Operation("counter increment would overflow".into()))?;
        entry.value = next.to_string();

        trace!(id = next, "allocated id");
        Ok(next)
    }
}

#[async_trait]
impl<C: Clock> DedupIndex for InMemoryStore<C> {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<DedupLookup> {
        let key = self.keys.url_hash(fingerprint);
        let raw = self.get_raw(&key);
        Ok(decode_dedup(&key, raw))
    }

    async fn put_dedup(
        &self,
        fingerprint: &Fingerprint,
        code: &ShortCode,
        expiration: &ExpirationPolicy,
    ) -> Result<()> {
        self.set(
            self.keys.url_hash(fingerprint),
            code.as_str().to_owned(),
            expiration,
        );
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> MappingStore for InMemoryStore<C> {
    async fn put_mapping(
        &self,
        code: &ShortCode,
        url: &str,
        expiration: &ExpirationPolicy,
    ) -> Result<()> {
        self.set(self.keys.short_link_url(code), url.to_owned(), expiration);
        Ok(())
    }

    async fn get_mapping(&self, code: &ShortCode) -> Result<String> {
        let key = self.keys.short_link_url(code);
        self.get_raw(&key).ok_or(StorageError::NotFound(key))
    }

    async fn put_detail(
        &self,
        code: &ShortCode,
        detail: &UrlDetail,
        expiration: &ExpirationPolicy,
    ) -> Result<()> {
        let json = encode_detail(detail)?;
        self.set(self.keys.short_link_detail(code), json, expiration);
        Ok(())
    }

    async fn get_detail(&self, code: &ShortCode) -> Result<UrlDetail> {
        let key = self.keys.short_link_detail(code);
        let raw = self
            .get_raw(&key)
            .ok_or_else(|| StorageError::NotFound(key.clone()))?;
        decode_detail(&key, &raw)
    }
}

#[async_trait]
impl<C: Clock> LinkStore for InMemoryStore<C> {
    async fn discard(&self, link: &NewLink) -> Result<()> {
        self.storage.remove(&self.keys.short_link_url(&link.code));
        self.storage.remove(&self.keys.short_link_detail(&link.code));
        self.storage
            .remove_if(&self.keys.url_hash(&link.fingerprint), |_, e| {
                e.value == link.code.as_str()
            });
        Ok(())
    }

    /// Writes the three entries with one shared expiry instant.
    async fn put_link(&self, link: &NewLink) -> Result<()> {
        let json = encode_detail(&link.detail)?;
        let expire_at = link.expiration.expire_at(self.clock.now());

        self.set_until(
            self.keys.short_link_url(&link.code),
            link.detail.url.clone(),
            expire_at,
        );
        self.set_until(self.keys.short_link_detail(&link.code), json, expire_at);
        self.set_until(
            self.keys.url_hash(&link.fingerprint),
            link.code.as_str().to_owned(),
            expire_at,
        );

        trace!(code = %link.code, "stored link");
        Ok(())
    }
}
