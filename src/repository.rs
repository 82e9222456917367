//! Typed access to collections, plus id indexes for cross-collection lookups.

use crate::driver::StorageDriver;
use crate::model::Collection;
use crate::store::DocumentStore;
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;

/// Load/save one record type through a [`DocumentStore`].
///
/// Like the store, a repository never fails: entries that cannot be read as
/// `T` (say, a bare number inside `students.json`) are skipped by `load`
/// with a warning. `append` and `remove_where` work on the stored JSON, so
/// records they do not add or drop keep their exact stored form; only
/// `save` re-encodes every record.
pub struct Repository<'s, T, D> {
    store: &'s DocumentStore<D>,
    _marker: PhantomData<T>,
}

impl<'s, T, D> Repository<'s, T, D>
where
    T: Collection,
    D: StorageDriver,
{
    pub(crate) fn new(store: &'s DocumentStore<D>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// All records in stored order.
    pub fn load(&self) -> Vec<T> {
        self.load_raw()
            .into_iter()
            .enumerate()
            .filter_map(|(i, raw)| match serde_json::from_value(raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping entry {i} of {}: {e}", T::FILE_NAME);
                    None
                }
            })
            .collect()
    }

    /// Replace the whole collection.
    pub fn save(&self, records: &[T]) {
        self.store.save(T::FILE_NAME, &to_values(records));
    }

    /// Add `record` after the stored entries. Existing entries are written
    /// back exactly as they were read.
    pub fn append(&self, record: T) {
        let mut raw = self.load_raw();
        match serde_json::to_value(&record) {
            Ok(value) => raw.push(value),
            Err(e) => {
                warn!("cannot encode record {} of {}: {e}", record.id(), T::FILE_NAME);
                return;
            }
        }
        self.store.save(T::FILE_NAME, &raw);
    }

    /// Rewrite the collection without records matching `pred`. Returns how
    /// many were dropped; nothing is written when that is zero. Entries that
    /// do not read as `T` never match and are kept untouched.
    pub fn remove_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let raw = self.load_raw();
        let before = raw.len();
        let kept: Vec<Value> = raw
            .into_iter()
            .filter(|value| match T::deserialize(value) {
                Ok(record) => !pred(&record),
                Err(_) => true,
            })
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.store.save(T::FILE_NAME, &kept);
        }
        removed
    }

    fn load_raw(&self) -> Vec<Value> {
        self.store.load(T::FILE_NAME, &to_values(&T::defaults()))
    }

    /// First record whose id equals `id`.
    pub fn find(&self, id: &str) -> Option<T> {
        self.load().into_iter().find(|r| r.id() == id)
    }
}

impl<T, D> std::fmt::Debug for Repository<'_, T, D>
where
    T: Collection,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("file", &T::FILE_NAME)
            .finish_non_exhaustive()
    }
}

fn to_values<T: Collection>(records: &[T]) -> Vec<Value> {
    records
        .iter()
        .filter_map(|r| match serde_json::to_value(r) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("cannot encode record {} of {}: {e}", r.id(), T::FILE_NAME);
                None
            }
        })
        .collect()
}

/// Records of one collection keyed by id, built once per operation.
///
/// When ids repeat, the first record wins, matching a front-to-back scan.
#[derive(Debug)]
pub struct IdIndex<'a, T> {
    by_id: HashMap<&'a str, &'a T>,
}

impl<'a, T: Collection> IdIndex<'a, T> {
    /// Index `records` by id.
    pub fn build(records: &'a [T]) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for record in records {
            by_id.entry(record.id()).or_insert(record);
        }
        Self { by_id }
    }

    /// Record with this id, if any.
    pub fn get(&self, id: &str) -> Option<&'a T> {
        self.by_id.get(id).copied()
    }

    /// `true` if some record has this id.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// `true` when nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Group records by a text key, keeping stored order inside each group.
/// Records whose key is `None` are grouped under `None`.
pub fn group_by<'a, T, F>(records: &'a [T], key: F) -> HashMap<Option<&'a str>, Vec<&'a T>>
where
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut groups: HashMap<Option<&'a str>, Vec<&'a T>> = HashMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(record);
    }
    groups
}
