//! Radix-62 positional encoding of identifiers.
//!
//! Digits are drawn from `0-9A-Za-z` in that order, which is also ASCII
//! order, so two encodings of equal length compare lexicographically the same
//! way their identifiers compare numerically.

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const RADIX: u64 = 62;

/// Length of the encoding of `u64::MAX`, the longest possible output.
pub const MAX_ENCODED_LEN: usize = 11;

/// Encodes `id` most significant digit first, without padding.
///
/// `0` encodes as `"0"`.
///
/// # Examples
///
/// ```
/// use shortlink_core::base62;
///
/// assert_eq!(base62::encode(61), "z");
/// assert_eq!(base62::encode(62), "10");
/// ```
pub fn encode(id: u64) -> String {
    if id == 0 {
        return "0".to_string();
    }

    let mut buf = [0_u8; MAX_ENCODED_LEN];
    let mut pos = MAX_ENCODED_LEN;
    let mut rest = id;
    while rest > 0 {
        pos -= 1;
        buf[pos] = ALPHABET[(rest % RADIX) as usize];
        rest /= RADIX;
    }

    buf[pos..].iter().map(|&b| b as char).collect()
}

/// Decodes a radix-62 string back into an identifier.
///
/// Returns `None` for an empty input, a character outside the alphabet or a
/// value that does not fit in a `u64`.
pub fn decode(code: &str) -> Option<u64> {
    if code.is_empty() {
        return None;
    }

    code.bytes().try_fold(0_u64, |acc, b| {
        acc.checked_mul(RADIX)?.checked_add(digit_value(b)?)
    })
}

fn digit_value(b: u8) -> Option<u64> {
    match b {
        b'0'..=b'9' => Some(u64::from(b - b'0')),
        b'A'..=b'Z' => Some(u64::from(b - b'A') + 10),
        b'a'..=b'z' => Some(u64::from(b - b'a') + 36),
        _ => None,
    }
}
