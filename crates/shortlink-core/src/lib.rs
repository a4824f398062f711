//! Core types and traits for the shortlink URL shortener.
//!
//! This crate provides the short code encoding, the URL fingerprint, the
//! error taxonomy and the storage contract shared by the store backends and
//! the shortening engine.

pub mod base62;
pub mod clock;
pub mod error;
pub mod fingerprint;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, ShortenerError, StorageError};
pub use fingerprint::Fingerprint;
pub use repository::{
    DedupIndex, DedupLookup, IdAllocator, LinkStore, MappingStore, NewLink, UrlDetail,
};
pub use shortcode::ShortCode;
pub use shortener::{ExpirationPolicy, Shortener, TtlMinutes};
