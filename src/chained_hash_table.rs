//! ChainedHashTable: public insert/get/remove/teardown protocol over
//! `BucketStore`, plus the load-factor driven resize.

use crate::config::TableConfig;
use crate::error::{AllocFailure, TableError};
use crate::guard::{Phase, WalkGuard};
use crate::ops::KeyOps;
use crate::store::{BucketStore, Located};
use core::fmt;
use std::io;

/// A separately chained hash table generic over its hash/equality
/// capability `O`.
///
/// Keys are unique under `O::compare`. After every successful insert
/// `len() / bucket_count() <= max_load_factor`, unless growth was refused
/// (bucket ceiling reached or allocator failure), in which case the table
/// keeps working above its target load. `bucket_count()` never decreases.
///
/// Tables are single-threaded and cannot be sent across threads:
///
/// ```compile_fail
/// use chained_hashtable::{ChainedHashTable, StrOps};
/// fn assert_send<T: Send>() {}
/// assert_send::<ChainedHashTable<String, i32, StrOps>>();
/// ```
pub struct ChainedHashTable<K, V, O> {
    ops: O,
    config: TableConfig,
    store: BucketStore<K, V>,
    guard: WalkGuard,
}

/// Snapshot of table shape, for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct TableStats {
    pub len: usize,
    pub bucket_count: usize,
    /// Buckets holding at least one entry.
    pub used_buckets: usize,
    pub longest_chain: usize,
    pub load_factor: f64,
}

impl<K, V, O> ChainedHashTable<K, V, O>
where
    O: KeyOps<K>,
{
    /// Create an empty table with 257 buckets and a 0.7 load bound.
    pub fn new(ops: O) -> Result<Self, TableError> {
        Self::with_config(ops, TableConfig::default())
    }

    pub fn with_config(ops: O, config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;
        let store = BucketStore::try_new(config.initial_buckets)?;
        Ok(Self {
            ops,
            config,
            store,
            guard: WalkGuard::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.store.bucket_count()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.bucket_count() as f64
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    fn locate(&self, key: &K) -> Located {
        let hash = {
            let _busy = self.guard.enter(Phase::Hash);
            self.ops.hash(key)
        };
        let _busy = self.guard.enter(Phase::Walk);
        self.store.locate(&self.ops, hash, key)
    }

    /// Insert `key => value`.
    ///
    /// If an equal key is already stored its value is replaced in place and
    /// the previous value is returned; length and bucket count are unchanged
    /// and the stored key is kept. Disposing of the returned value is up to
    /// the caller.
    ///
    /// A new key that would exceed the configured entry budget fails with
    /// `TableError::Allocation` and leaves the table as it was.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let loc = self.locate(&key);
        if let Some((_, k)) = loc.found {
            let slot = &mut self.store.entry_mut(k).value;
            return Ok(Some(core::mem::replace(slot, value)));
        }

        if let Some(limit) = self.config.max_entries {
            if self.store.len() >= limit {
                return Err(AllocFailure::EntryBudget { limit }.into());
            }
        }

        self.store.insert_at(loc.bucket, loc.hash, key, value);
        if self.config.over_threshold(self.store.len(), self.store.bucket_count()) {
            self.grow();
        }
        Ok(None)
    }

    /// Best-effort resize. A refused resize is not an error for the insert
    /// that triggered it; the table stays valid over its target load.
    fn grow(&mut self) {
        let len = self.store.len();
        let old = self.store.bucket_count();
        let res = match self.config.next_bucket_count(len, old) {
            Some(new) => self
                .store
                .rehash(new)
                .map(|()| new)
                .map_err(AllocFailure::from),
            None => Err(AllocFailure::BucketBudget {
                limit: self.config.max_buckets.unwrap_or(old),
            }),
        };
        match res {
            Ok(new) => {
                tracing::trace!(len, old_buckets = old, new_buckets = new, "rehashed table");
            }
            Err(reason) => {
                tracing::debug!(
                    len,
                    buckets = old,
                    %reason,
                    "resize refused; continuing above load factor"
                );
            }
        }
    }

    /// Value stored under `key`, or `TableError::NotFound`.
    pub fn get(&self, key: &K) -> Result<&V, TableError> {
        match self.locate(key).found {
            Some((_, k)) => Ok(&self.store.entry(k).value),
            None => Err(TableError::NotFound),
        }
    }

    pub fn get_mut(&mut self, key: &K) -> Result<&mut V, TableError> {
        match self.locate(key).found {
            Some((_, k)) => Ok(&mut self.store.entry_mut(k).value),
            None => Err(TableError::NotFound),
        }
    }

    /// Stored key and value for `key`.
    pub fn get_key_value(&self, key: &K) -> Result<(&K, &V), TableError> {
        match self.locate(key).found {
            Some((_, k)) => {
                let e = self.store.entry(k);
                Ok((&e.key, &e.value))
            }
            None => Err(TableError::NotFound),
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).found.is_some()
    }

    fn take(&mut self, key: &K) -> Result<(K, V), TableError> {
        let loc = self.locate(key);
        let (prev, k) = loc.found.ok_or(TableError::NotFound)?;
        self.store
            .unlink(loc.bucket, prev, k)
            .ok_or(TableError::NotFound)
    }

    /// Remove `key` and return ownership of its value.
    pub fn remove(&mut self, key: &K) -> Result<V, TableError> {
        self.take(key).map(|(_, v)| v)
    }

    /// Remove `key` and return the stored key together with the value.
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V), TableError> {
        self.take(key)
    }

    /// Remove `key`, passing its value to `dispose` before the entry is
    /// released. `dispose` is not called when the key is absent.
    pub fn remove_with<F>(&mut self, key: &K, dispose: F) -> Result<(), TableError>
    where
        F: FnOnce(V),
    {
        let (_, v) = self.take(key)?;
        dispose(v);
        Ok(())
    }

    /// Destroy the table. Values are dropped; nothing else is released.
    pub fn teardown(self) {
        self.store.drain_into(|_, _| {});
    }

    /// Destroy the table, handing every stored value to `dispose` exactly
    /// once.
    pub fn teardown_with<F>(self, mut dispose: F)
    where
        F: FnMut(V),
    {
        self.store.drain_into(|_, v| dispose(v));
    }

    /// Unordered traversal: bucket order, then chain order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.store.iter().map(|e| (&e.key, &e.value))
    }

    /// Unordered mutable traversal over values, in arena order rather than
    /// bucket order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.store.iter_mut()
    }

    pub fn stats(&self) -> TableStats {
        let mut used_buckets = 0;
        let mut longest_chain = 0;
        for b in 0..self.store.bucket_count() {
            let n = self.store.chain(b).count();
            if n > 0 {
                used_buckets += 1;
            }
            longest_chain = longest_chain.max(n);
        }
        TableStats {
            len: self.len(),
            bucket_count: self.bucket_count(),
            used_buckets,
            longest_chain,
            load_factor: self.load_factor(),
        }
    }
}

impl<K, V, O> ChainedHashTable<K, V, O>
where
    K: fmt::Debug,
    V: fmt::Debug,
    O: KeyOps<K>,
{
    /// Write the table layout to `out`: a summary line, then one line per
    /// non-empty bucket, or per bucket when `full` is set.
    pub fn dump<W: io::Write>(&self, out: &mut W, full: bool) -> io::Result<()> {
        writeln!(
            out,
            "table: len={} buckets={} load={:.3}",
            self.len(),
            self.bucket_count(),
            self.load_factor()
        )?;
        for b in 0..self.store.bucket_count() {
            let mut chain = self.store.chain(b).peekable();
            if chain.peek().is_none() && !full {
                continue;
            }
            write!(out, "[{b}]:")?;
            for k in chain {
                let e = self.store.entry(k);
                write!(out, " ({:?} => {:?})", e.key, e.value)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl<K, V, O> fmt::Debug for ChainedHashTable<K, V, O>
where
    K: fmt::Debug,
    V: fmt::Debug,
    O: KeyOps<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
