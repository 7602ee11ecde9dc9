//! Redeem code and key string formats.
//!
//! - Redeem code: 12 symbols of `[A-Z0-9]`
//! - Key: `vicat-xxxx-xxxx-xxxx`, each `x` one of `[a-z0-9]`

use crate::crypto::random::{random_string, LOWER_ALNUM, UPPER_ALNUM};

/// Leading segment of every key.
pub const KEY_PREFIX: &str = "vicat";

/// Length of a redeem code.
pub const REDEEM_CODE_LEN: usize = 12;

/// Number of random segments in a key.
pub const KEY_SEGMENTS: usize = 3;

/// Symbols per key segment.
pub const KEY_SEGMENT_LEN: usize = 4;

/// Draw a fresh redeem code. Not checked against existing codes.
pub fn generate_redeem_code() -> String {
    random_string(UPPER_ALNUM, REDEEM_CODE_LEN)
}

/// Draw a fresh key. Not checked against existing keys.
pub fn generate_key() -> String {
    let mut key = String::from(KEY_PREFIX);
    for _ in 0..KEY_SEGMENTS {
        key.push('-');
        key.push_str(&random_string(LOWER_ALNUM, KEY_SEGMENT_LEN));
    }
    key
}

/// Whether `code` has redeem code shape.
pub fn is_redeem_code(code: &str) -> bool {
    code.len() == REDEEM_CODE_LEN && code.bytes().all(|b| UPPER_ALNUM.contains(&b))
}

/// Whether `key` has vicat key shape.
pub fn is_key_format(key: &str) -> bool {
    let mut parts = key.split('-');
    if parts.next() != Some(KEY_PREFIX) {
        return false;
    }

    let segments: Vec<&str> = parts.collect();
    segments.len() == KEY_SEGMENTS
        && segments.iter().all(|segment| {
            segment.len() == KEY_SEGMENT_LEN && segment.bytes().all(|b| LOWER_ALNUM.contains(&b))
        })
}
