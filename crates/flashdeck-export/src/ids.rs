//! Identifiers and checksums for package rows.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Issues 64-bit row ids that never repeat and always increase.
///
/// Ids track wall-clock milliseconds. When the clock has not moved past the
/// previous id (bursts inside one millisecond, or a clock stepping backwards)
/// the previous id plus one is issued instead.
///
/// One generator is safe to share between threads behind an `Arc`; the
/// compare-and-swap keeps ids unique even when builds run concurrently.
///
/// ```
/// use flashdeck_export::IdGenerator;
///
/// let ids = IdGenerator::new();
/// let a = ids.next();
/// let b = ids.next();
/// assert!(b > a);
/// ```
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    /// Create a generator that has issued nothing yet.
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Issue the next id using the system clock.
    pub fn next(&self) -> i64 {
        self.next_at(now_millis())
    }

    /// Issue the next id as if the clock read `now_ms`.
    pub fn next_at(&self, now_ms: i64) -> i64 {
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(successor(last, now_ms))
            })
            .unwrap_or_else(|last| last);
        successor(previous, now_ms)
    }

    /// The most recently issued id, or 0.
    pub fn last(&self) -> i64 {
        self.last.load(Ordering::SeqCst)
    }

    /// Forget every issued id.
    pub fn reset(&self) {
        self.last.store(0, Ordering::SeqCst);
    }
}

fn successor(last: i64, now_ms: i64) -> i64 {
    if now_ms > last { now_ms } else { last + 1 }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Characters used for note GUIDs.
#[cfg(feature = "apkg")]
const GUID_CHARS: &[u8] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ!#$%&()*+,-./:;<=>?@[]^_`{|}~";

/// Length of a note GUID.
#[cfg(feature = "apkg")]
pub const GUID_LEN: usize = 10;

/// Generate a random note GUID in the importer's alphabet.
#[cfg(feature = "apkg")]
pub fn guid() -> String {
    use rand::Rng;

    let mut bytes = [0u8; GUID_LEN];
    rand::rng().fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|b| GUID_CHARS[*b as usize % GUID_CHARS.len()] as char)
        .collect()
}

/// Checksum of a note's sort field.
///
/// A 32-bit rolling hash (`h * 31 + unit` over UTF-16 code units). The
/// importer recomputes its own checksum on import, so this only has to be
/// present and stable, not match any particular hash family.
pub fn field_checksum(text: &str) -> i64 {
    let hash = text
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));
    i64::from(hash.unsigned_abs())
}
