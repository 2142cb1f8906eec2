//! BucketStore: bucket heads over a generational entry arena.
//!
//! Entries live in a `SlotMap` and are never moved out of it while they are
//! in the table. A chain is a singly linked list threaded through the arena
//! by `EntryKey`: each bucket holds the key of its head entry, each entry the
//! key of its successor. Relinking (insert at head, unlink, rehash) only
//! rewrites those keys.
//!
//! Every entry caches the hash its key produced on insert. Rehashing reuses
//! the cached value, so no user code runs while chains are being rebuilt.

use crate::ops::KeyOps;
use slotmap::{new_key_type, SlotMap};
use std::collections::TryReserveError;

new_key_type! {
    pub(crate) struct EntryKey;
}

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    next: Option<EntryKey>,
}

/// Result of a chain walk: where the key belongs, and the matching entry
/// together with its predecessor in the chain, if any.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Located {
    pub(crate) bucket: usize,
    pub(crate) hash: u64,
    pub(crate) found: Option<(Option<EntryKey>, EntryKey)>,
}

pub(crate) struct BucketStore<K, V> {
    heads: Vec<Option<EntryKey>>,
    slots: SlotMap<EntryKey, Entry<K, V>>,
}

#[inline]
fn index_for(hash: u64, buckets: usize) -> usize {
    (hash % buckets as u64) as usize
}

fn empty_heads(n: usize) -> Result<Vec<Option<EntryKey>>, TryReserveError> {
    let mut heads = Vec::new();
    heads.try_reserve_exact(n)?;
    heads.resize(n, None);
    Ok(heads)
}

impl<K, V> BucketStore<K, V> {
    pub(crate) fn try_new(buckets: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            heads: empty_heads(buckets)?,
            slots: SlotMap::with_key(),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    /// Walk the chain `hash` selects and return the first entry whose key the
    /// comparator calls equal.
    pub(crate) fn locate<O>(&self, ops: &O, hash: u64, key: &K) -> Located
    where
        O: KeyOps<K> + ?Sized,
    {
        let bucket = index_for(hash, self.heads.len());
        let mut prev = None;
        let mut cur = self.heads[bucket];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash && ops.equal(&e.key, key) {
                return Located {
                    bucket,
                    hash,
                    found: Some((prev, k)),
                };
            }
            prev = cur;
            cur = e.next;
        }
        Located {
            bucket,
            hash,
            found: None,
        }
    }

    /// Link a new entry as the head of `bucket`. Does not look for
    /// duplicates; callers `locate` first.
    pub(crate) fn insert_at(&mut self, bucket: usize, hash: u64, key: K, value: V) -> EntryKey {
        let next = self.heads[bucket];
        let k = self.slots.insert(Entry {
            key,
            value,
            hash,
            next,
        });
        self.heads[bucket] = Some(k);
        k
    }

    /// Detach `entry` from its chain and hand it back. `prev` must be the
    /// predecessor `locate` reported.
    pub(crate) fn unlink(
        &mut self,
        bucket: usize,
        prev: Option<EntryKey>,
        entry: EntryKey,
    ) -> Option<(K, V)> {
        let removed = self.slots.remove(entry)?;
        match prev {
            Some(p) => self.slots[p].next = removed.next,
            None => self.heads[bucket] = removed.next,
        }
        Some((removed.key, removed.value))
    }

    pub(crate) fn entry(&self, k: EntryKey) -> &Entry<K, V> {
        &self.slots[k]
    }

    pub(crate) fn entry_mut(&mut self, k: EntryKey) -> &mut Entry<K, V> {
        &mut self.slots[k]
    }

    /// Move every entry onto a fresh bucket array of `new_buckets` heads.
    ///
    /// The new array is reserved before anything is touched: if that fails
    /// the store is unchanged. Entries stay in the arena; only `next` links
    /// and bucket heads are rewritten.
    pub(crate) fn rehash(&mut self, new_buckets: usize) -> Result<(), TryReserveError> {
        let mut heads = empty_heads(new_buckets)?;
        for bucket in 0..self.heads.len() {
            let mut cur = self.heads[bucket].take();
            while let Some(k) = cur {
                let e = &mut self.slots[k];
                cur = e.next;
                let idx = index_for(e.hash, new_buckets);
                e.next = heads[idx];
                heads[idx] = Some(k);
            }
        }
        self.heads = heads;
        Ok(())
    }

    /// Keys of the chain in `bucket`, head first.
    pub(crate) fn chain(&self, bucket: usize) -> Chain<'_, K, V> {
        Chain {
            store: self,
            cur: self.heads[bucket],
        }
    }

    /// Visit every entry in bucket order, then chain order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        (0..self.heads.len()).flat_map(move |b| self.chain(b).map(move |k| &self.slots[k]))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.slots.values_mut().map(|e| (&e.key, &mut e.value))
    }

    /// Consume the store, handing each value to `f`. Chains are walked in
    /// order; every entry is visited exactly once.
    pub(crate) fn drain_into<F>(self, mut f: F)
    where
        F: FnMut(K, V),
    {
        let Self { heads, mut slots } = self;
        for head in heads {
            let mut cur = head;
            while let Some(k) = cur {
                let Some(e) = slots.remove(k) else {
                    break;
                };
                cur = e.next;
                f(e.key, e.value);
            }
        }
        debug_assert!(slots.is_empty(), "entry not reachable from any bucket");
    }
}

pub(crate) struct Chain<'a, K, V> {
    store: &'a BucketStore<K, V>,
    cur: Option<EntryKey>,
}

impl<K, V> Iterator for Chain<'_, K, V> {
    type Item = EntryKey;

    fn next(&mut self) -> Option<EntryKey> {
        let k = self.cur?;
        self.cur = self.store.slots[k].next;
        Some(k)
    }
}
