//! Disposable containers for integration tests.

pub mod error;
pub mod redis_server;

pub use error::{Result, TestInfraError};
pub use redis_server::{RedisServer, RedisServerConfig};
