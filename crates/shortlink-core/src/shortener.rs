use crate::repository::UrlDetail;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use std::num::NonZeroU64;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Longest accepted TTL: one hundred years.
pub const MAX_TTL_MINUTES: i64 = 100 * 365 * 24 * 60;

/// A positive TTL no larger than [`MAX_TTL_MINUTES`].
///
/// Only [`ExpirationPolicy::from_minutes`] builds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlMinutes(NonZeroU64);

impl TtlMinutes {
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

/// Expiration policy shared by the three entries of one shortened URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// A TTL of zero minutes: the entries are written without expiry.
    Never,
    /// The entries expire this many minutes after they are written.
    AfterMinutes(TtlMinutes),
}

impl ExpirationPolicy {
    /// Converts a caller-supplied TTL in minutes.
    ///
    /// Negative values and values above [`MAX_TTL_MINUTES`] are rejected with
    /// `InvalidInput`; zero means [`ExpirationPolicy::Never`].
    pub fn from_minutes(minutes: i64) -> Result<Self> {
        if minutes > MAX_TTL_MINUTES {
            return Err(crate::error::ShortenerError::InvalidInput(format!(
                "expiration_in_minutes must be at most {MAX_TTL_MINUTES}, got {minutes}"
            )));
        }

        let minutes = u64::try_from(minutes).map_err(|_| {
            crate::error::ShortenerError::InvalidInput(format!(
                "expiration_in_minutes must not be negative, got {minutes}"
            ))
        })?;

        Ok(NonZeroU64::new(minutes).map_or(Self::Never, |m| Self::AfterMinutes(TtlMinutes(m))))
    }

    /// The TTL in minutes, `0` for [`ExpirationPolicy::Never`].
    pub fn minutes(&self) -> u64 {
        match self {
            Self::Never => 0,
            Self::AfterMinutes(minutes) => minutes.get(),
        }
    }

    /// The TTL in seconds, as handed to the store's native expiry.
    pub fn seconds(&self) -> Option<u64> {
        match self {
            Self::Never => None,
            Self::AfterMinutes(minutes) => Some(minutes.get() * 60),
        }
    }

    /// The instant at which an entry written at `written_at` expires.
    pub fn expire_at(&self, written_at: Timestamp) -> Option<Timestamp> {
        let seconds = i64::try_from(self.seconds()?).ok()?;
        written_at
            .checked_add(SignedDuration::from_secs(seconds))
            .ok()
    }
}

/// The shortening contract consumed by the HTTP layer.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Returns the short code for `long_url`, reusing a live one when the
    /// same URL was shortened before and has not expired.
    async fn shorten(&self, long_url: &str, ttl_minutes: i64) -> Result<ShortCode>;

    /// Resolves a short code to its long URL.
    async fn unshorten(&self, code: &str) -> Result<String>;

    /// Returns the detail record attached to a short code.
    async fn short_link_info(&self, code: &str) -> Result<UrlDetail>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShortenerError;

    #[test]
    fn zero_minutes_never_expires() {
        let policy = ExpirationPolicy::from_minutes(0).unwrap();
        assert_eq!(policy, ExpirationPolicy::Never);
        assert_eq!(policy.minutes(), 0);
        assert_eq!(policy.seconds(), None);
        assert_eq!(policy.expire_at(Timestamp::UNIX_EPOCH), None);
    }

    #[test]
    fn positive_minutes() {
        let policy = ExpirationPolicy::from_minutes(60).unwrap();
        assert_eq!(policy.minutes(), 60);
        assert_eq!(policy.seconds(), Some(3600));
        assert_eq!(
            policy.expire_at(Timestamp::UNIX_EPOCH),
            Some(Timestamp::from_second(3600).unwrap())
        );
    }

    #[test]
    fn negative_minutes_rejected() {
        let err = ExpirationPolicy::from_minutes(-1).unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidInput(_)));
    }

    #[test]
    fn oversized_minutes_rejected() {
        assert!(ExpirationPolicy::from_minutes(MAX_TTL_MINUTES).is_ok());
        let err = ExpirationPolicy::from_minutes(MAX_TTL_MINUTES + 1).unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidInput(_)));
    }

    #[test]
    fn largest_ttl_converts_without_overflow() {
        let policy = ExpirationPolicy::from_minutes(MAX_TTL_MINUTES).unwrap();
        let ExpirationPolicy::AfterMinutes(ttl) = policy else {
            panic!("expected a finite ttl");
        };
        assert_eq!(ttl.get(), MAX_TTL_MINUTES as u64);

        let seconds = MAX_TTL_MINUTES as u64 * 60;
        assert_eq!(policy.seconds(), Some(seconds));
        assert_eq!(
            policy.expire_at(Timestamp::UNIX_EPOCH),
            Some(Timestamp::from_second(seconds as i64).unwrap())
        );
    }
}
