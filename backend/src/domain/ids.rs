//! Record identifiers: base36 of the current time in milliseconds followed by
//! a random base36 suffix. Unique enough for a single desk, not for security.

use chrono::Utc;
use uuid::Uuid;

const RANDOM_SUFFIX_LEN: usize = 11;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a new record id from the current time
pub fn generate_id() -> String {
    generate_id_at(Utc::now().timestamp_millis())
}

/// Generate a record id for the given unix timestamp in milliseconds
pub fn generate_id_at(timestamp_millis: i64) -> String {
    let mut suffix = to_base36(Uuid::new_v4().as_u128());
    suffix.truncate(RANDOM_SUFFIX_LEN);
    format!("{}{}", to_base36(timestamp_millis.max(0) as u128), suffix)
}

pub fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
