use crate::codec::{decode_detail, decode_dedup, encode_detail};
use crate::keys::KeySpace;
use async_trait::async_trait;
use redis::AsyncCommands;
use shortlink_core::repository::Result;
use shortlink_core::{
    DedupIndex, DedupLookup, ExpirationPolicy, Fingerprint, IdAllocator, LinkStore, MappingStore,
    NewLink, ShortCode, StorageError, UrlDetail,
};
use tracing::{debug, info, trace, warn};

/// Redis-backed store shared by every engine instance of a deployment.
///
/// All keys live under a namespace prefix (`db_shortlink:` by default).
/// Expiry is delegated to Redis: entries are written with `SET ... EX` or,
/// for [`ExpirationPolicy::Never`], a plain `SET`.
#[derive(Debug, Clone)]
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
    keys: KeySpace,
}

pub(crate) fn map_redis_error(operation: &str, err: redis::RedisError) -> StorageError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        StorageError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        StorageError::Unavailable(message)
    } else {
        StorageError::Operation(message)
    }
}

impl RedisStore {
    /// Creates a store on top of an existing connection.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self {
            conn,
            keys: KeySpace::default(),
        }
    }

    /// Creates a store with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Namespace for every key (e.g., "staging:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            keys: KeySpace::new(key_prefix),
        }
    }

    /// Opens a connection to `redis_url` and verifies it with a `PING`.
    ///
    /// Any failure is returned as [`StorageError::Unavailable`] so the caller
    /// can refuse to start.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            StorageError::Unavailable(format!("invalid redis connection info: {e}"))
        })?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StorageError::Unavailable(format!("failed to connect to redis: {e}")))?;

        let store = Self::new(conn);
        store
            .ping()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        info!("connected to redis");
        Ok(store)
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| map_redis_error("redis PING failed", e))
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| map_redis_error("failed to fetch value from Redis", e))
    }

    async fn set(&self, key: &str, value: &str, expiration: &ExpirationPolicy) -> Result<()> {
        let mut conn = self.conn.clone();
        let result = match expiration.seconds() {
            Some(seconds) => conn.set_ex::<_, _, ()>(key, value, seconds).await,
            None => conn.set::<_, _, ()>(key, value).await,
        };
        result.map_err(|e| map_redis_error("failed to store value in Redis", e))
    }
}

fn queue_set(
    pipe: &mut redis::Pipeline,
    key: String,
    value: String,
    expiration: &ExpirationPolicy,
) {
    match expiration.seconds() {
        Some(seconds) => pipe.set_ex(key, value, seconds).ignore(),
        None => pipe.set(key, value).ignore(),
    };
}

#[async_trait]
impl IdAllocator for RedisStore {
    async fn next_id(&self) -> Result<u64> {
        let key = self.keys.next_url_id();
        let mut conn = self.conn.clone();

        // INCR returns the post-increment value in the same round trip.
        let id = conn
            .incr::<_, _, u64>(&key, 1_u64)
            .await
            .map_err(|e| map_redis_error("failed to increment id counter", e))?;

        trace!(id, "allocated id");
        Ok(id)
    }
}

#[async_trait]
impl DedupIndex for RedisStore {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<DedupLookup> {
        let key = self.keys.url_hash(fingerprint);
        trace!(fingerprint = %fingerprint, "looking up dedup entry");

        let raw = self.get(&key).await?;
        Ok(decode_dedup(&key, raw))
    }

    async fn put_dedup(
        &self,
        fingerprint: &Fingerprint,
        code: &ShortCode,
        expiration: &ExpirationPolicy,
    ) -> Result<()> {
        let key = self.keys.url_hash(fingerprint);
        self.set(&key, code.as_str(), expiration).await
    }
}

#[async_trait]
impl MappingStore for RedisStore {
    async fn put_mapping(
        &self,
        code: &ShortCode,
        url: &str,
        expiration: &ExpirationPolicy,
    ) -> Result<()> {
        let key = self.keys.short_link_url(code);
        self.set(&key, url, expiration).await
    }

    async fn get_mapping(&self, code: &ShortCode) -> Result<String> {
        let key = self.keys.short_link_url(code);
        trace!(code = %code, "fetching url mapping");

        self.get(&key).await?.ok_or(StorageError::NotFound(key))
    }

    async fn put_detail(
        &self,
        code: &ShortCode,
        detail: &UrlDetail,
        expiration: &ExpirationPolicy,
    ) -> Result<()> {
        let key = self.keys.short_link_detail(code);
        let json = encode_detail(detail)?;
        self.set(&key, &json, expiration).await
    }

    async fn get_detail(&self, code: &ShortCode) -> Result<UrlDetail> {
        let key = self.keys.short_link_detail(code);
        trace!(code = %code, "fetching url detail");

        match self.get(&key).await? {
            Some(raw) => decode_detail(&key, &raw),
            None => Err(StorageError::NotFound(key)),
        }
    }
}

#[async_trait]
impl LinkStore for RedisStore {
    async fn discard(&self, link: &NewLink) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(vec![
            self.keys.short_link_url(&link.code),
            self.keys.short_link_detail(&link.code),
        ])
        .await
        .map_err(|e| map_redis_error("failed to delete link entries", e))?;

        let dedup_key = self.keys.url_hash(&link.fingerprint);
        if self.get(&dedup_key).await?.as_deref() == Some(link.code.as_str()) {
            conn.del::<_, ()>(&dedup_key)
                .await
                .map_err(|e| map_redis_error("failed to delete dedup entry", e))?;
        }

        Ok(())
    }

    /// Writes the three entries in one `MULTI`/`EXEC` transaction.
    async fn put_link(&self, link: &NewLink) -> Result<()> {
        let json = encode_detail(&link.detail)?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        queue_set(
            &mut pipe,
            self.keys.short_link_url(&link.code),
            link.detail.url.clone(),
            &link.expiration,
        );
        queue_set(
            &mut pipe,
            self.keys.short_link_detail(&link.code),
            json,
            &link.expiration,
        );
        queue_set(
            &mut pipe,
            self.keys.url_hash(&link.fingerprint),
            link.code.as_str().to_owned(),
            &link.expiration,
        );

        let mut conn = self.conn.clone();
        match pipe.query_async::<()>(&mut conn).await {
            Ok(()) => {
                debug!(code = %link.code, "stored link in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(code = %link.code, error = %e, "failed to store link in Redis");
                Err(map_redis_error("failed to store link in Redis", e))
            }
        }
    }
}
