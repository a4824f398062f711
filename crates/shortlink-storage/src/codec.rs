//! Conversions between stored string values and domain types.

use shortlink_core::repository::Result;
use shortlink_core::{DedupLookup, ShortCode, StorageError, UrlDetail};
use tracing::warn;

/// Value left behind for a fingerprint that no longer points at a code.
pub const DEGENERATE_MARKER: &str = "{}";

/// Classifies the raw value of a fingerprint key.
pub fn decode_dedup(key: &str, raw: Option<String>) -> DedupLookup {
    let Some(raw) = raw else {
        return DedupLookup::Absent;
    };

    if raw.is_empty() || raw == DEGENERATE_MARKER {
        return DedupLookup::Degenerate;
    }

    match ShortCode::new(raw) {
        Ok(code) => DedupLookup::Present(code),
        Err(e) => {
            warn!(key = %key, error = %e, "dedup entry does not hold a short code");
            DedupLookup::Degenerate
        }
    }
}

pub fn encode_detail(detail: &UrlDetail) -> Result<String> {
    serde_json::to_string(detail)
        .map_err(|e| StorageError::InvalidData(format!("failed to serialize url detail: {e}")))
}

pub fn decode_detail(key: &str, raw: &str) -> Result<UrlDetail> {
    serde_json::from_str(raw).map_err(|e| {
        StorageError::InvalidData(format!("invalid url detail for key '{key}': {e}"))
    })
}
