//! A single entity collection with its id counter.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Access to the server-assigned identity of a stored record.
pub trait Record: Clone {
    /// Raw id value, unique within the record's collection.
    fn raw_id(&self) -> i32;

    /// When the record was inserted.
    fn created_at(&self) -> DateTime<Utc>;
}

/// Records of one entity type keyed by id, plus the next id to hand out.
///
/// Creation timestamps never decrease within a table, even if the wall clock
/// steps backwards, so creation order and id order always agree.
///
/// Not synchronized on its own; [`FormStore`](super::FormStore) wraps each
/// table in a mutex so that id assignment and insertion happen together.
#[derive(Debug)]
pub struct Table<T> {
    next_id: i32,
    last_created_at: Option<DateTime<Utc>>,
    rows: BTreeMap<i32, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            last_created_at: None,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Record> Table<T> {
    /// Assign the next id and the current time, build the record and insert it.
    ///
    /// Returns `None` without inserting if the id space is exhausted.
    pub fn insert_with(&mut self, build: impl FnOnce(i32, DateTime<Utc>) -> T) -> Option<T> {
        self.insert_at(Utc::now(), build)
    }

    /// Insert as if the clock read `now`, clamped to the last assigned timestamp.
    fn insert_at(
        &mut self,
        now: DateTime<Utc>,
        build: impl FnOnce(i32, DateTime<Utc>) -> T,
    ) -> Option<T> {
        let id = self.next_id;
        self.next_id = id.checked_add(1)?;

        let created_at = self.last_created_at.map_or(now, |last| last.max(now));
        self.last_created_at = Some(created_at);

        let record = build(id, created_at);
        self.rows.insert(id, record.clone());
        Some(record)
    }

    /// Look up a record by id.
    pub fn get(&self, id: i32) -> Option<&T> {
        self.rows.get(&id)
    }

    /// Iterate records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All records, newest first.
    ///
    /// Sorted by creation time descending; records created within the same
    /// clock tick fall back to id descending.
    pub fn newest_first(&self) -> Vec<T> {
        let mut records: Vec<T> = self.rows.values().cloned().collect();
        records.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.raw_id().cmp(&a.raw_id()))
        });
        records
    }

    #[cfg(test)]
    pub(crate) fn set_next_id(&mut self, next_id: i32) {
        self.next_id = next_id;
    }
}
