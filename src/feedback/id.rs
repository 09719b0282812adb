// SPDX-License-Identifier: MPL-2.0
//! Identifier generation for feedback items.
//!
//! Ids look like `fb_m2x9k1a0_q7c3z_42`: prefix, base36 wall-clock millis,
//! five random base36 characters, and a process-wide counter. The counter
//! alone keeps ids unique for the life of the process.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix used when none is configured.
pub const DEFAULT_ID_PREFIX: &str = "fb";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SUFFIX_LEN: usize = 5;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier of a feedback item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generates a fresh id with the given prefix.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(generate_id(prefix))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Produces a collision-resistant id: `{prefix}_{base36 millis}_{random}_{counter}`.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();

    let mut rng = rand::thread_rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();

    format!("{prefix}_{}_{suffix}_{count}", to_base36(millis))
}

/// Resets the process-wide counter.
///
/// Test support only: production code must never call this, since it
/// removes the uniqueness guarantee for ids generated afterwards.
#[doc(hidden)]
pub fn reset_id_counter() {
    COUNTER.store(0, Ordering::Relaxed);
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
