use std::collections::BTreeMap;

use crate::models::Versioned;

/// Newer-wins merge of incoming records into a stored collection.
///
/// An incoming record is written when no record with its key is stored, or
/// when its `updatedAt` is strictly greater than the stored one. Otherwise it
/// is dropped, so ties keep the stored record. Returns the number written.
pub fn merge_newer<T, I>(stored: &mut BTreeMap<i64, T>, incoming: I) -> usize
where
    T: Versioned,
    I: IntoIterator<Item = T>,
{
    let mut written = 0;
    for record in incoming {
        let key = record.key();
        let is_newer = match stored.get(&key) {
            Some(existing) => record.updated_at() > existing.updated_at(),
            None => true,
        };
        if is_newer {
            stored.insert(key, record);
            written += 1;
        }
    }
    written
}
