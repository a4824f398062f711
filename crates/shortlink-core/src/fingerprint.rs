use crate::base62;
use sha2::{Digest, Sha256};
use std::fmt::Display;

/// Salt mixed into every fingerprint. Changing it invalidates all dedup entries.
pub const FINGERPRINT_SALT: &str = "db_shortlink:urlhash:v1";

/// A content fingerprint of a long URL, used to detect repeat submissions.
///
/// The fingerprint is the first 8 bytes of `SHA-256(salt || 0x00 || url)`,
/// read big-endian and radix-62 encoded. It depends on the URL only, never on
/// the requested TTL, and is stable across processes.
///
/// Two distinct URLs may share a fingerprint (64-bit digest space). The second
/// URL would then be answered with the first URL's code until that mapping
/// expires. This risk is accepted and not detected.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of `url` with the fixed [`FINGERPRINT_SALT`].
    pub fn of(url: &str) -> Self {
        Self::with_salt(FINGERPRINT_SALT, url)
    }

    pub fn with_salt(salt: &str, url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update([0_u8]);
        hasher.update(url.as_bytes());
        let digest = hasher.finalize();

        let mut prefix = [0_u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        Self(base62::encode(u64::from_be_bytes(prefix)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
