use shortlink_core::{Fingerprint, ShortCode};

/// Namespace shared by every key of a deployment.
pub const DEFAULT_PREFIX: &str = "db_shortlink:";

/// Builds the keys of the persisted layout under a namespace prefix.
///
/// | Purpose | Key |
/// |---|---|
/// | counter | `<prefix>next.url.id` |
/// | code → url | `<prefix>shortlink:<code>:url` |
/// | fingerprint → code | `<prefix>urlhash:<fingerprint>:url` |
/// | code → detail | `<prefix>shortlink:<code>:detail` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn next_url_id(&self) -> String {
        format!("{}next.url.id", self.prefix)
    }

    pub fn short_link_url(&self, code: &ShortCode) -> String {
        format!("{}shortlink:{}:url", self.prefix, code.as_str())
    }

    pub fn url_hash(&self, fingerprint: &Fingerprint) -> String {
        format!("{}urlhash:{}:url", self.prefix, fingerprint.as_str())
    }

    pub fn short_link_detail(&self, code: &ShortCode) -> String {
        format!("{}shortlink:{}:detail", self.prefix, code.as_str())
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
