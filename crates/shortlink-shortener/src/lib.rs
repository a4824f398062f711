//! URL shortener service implementation.
//!
//! This crate provides [`ShortenerService`], the stateless shortening engine.
//! Core types are re-exported from `shortlink_core`.

pub mod service;

pub use service::ShortenerService;
pub use shortlink_core::{Shortener, ShortenerError};
