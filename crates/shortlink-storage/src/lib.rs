//! Store backends for the shortlink engine.
//!
//! [`RedisStore`] is the shared production store. [`InMemoryStore`] keeps the
//! same key layout in a process-local map and is used by tests and
//! single-process deployments.

pub mod codec;
pub mod keys;
pub mod memory;
pub mod redis;

pub use keys::KeySpace;
pub use memory::InMemoryStore;
pub use self::redis::RedisStore;
pub use shortlink_core::repository::{DedupIndex, IdAllocator, LinkStore, MappingStore, Result};
pub use shortlink_core::StorageError;
