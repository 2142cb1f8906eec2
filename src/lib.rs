//! chained-hashtable: a separately chained hash table for embedding in
//! other data-structure code, with the hash function and key comparator
//! supplied by the caller.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: amortized O(1) insert/get/remove over arbitrary key and value
//!   payloads, with a bounded load factor and predictable failure modes.
//! - Layers:
//!   - BucketStore<K, V>: bucket heads over a generational entry arena.
//!     Owns every entry; knows how to locate, link, unlink and rehash, and
//!     nothing about policy.
//!   - ChainedHashTable<K, V, O>: public protocol (insert-or-overwrite,
//!     get, remove with optional disposal, teardown with optional
//!     disposal) and the load-factor driven resize.
//!   - KeyOps<K>: hash/equality capability fixed at construction.
//!
//! Constraints
//! - Single-threaded, synchronous; no internal locking.
//! - Keys are unique under `KeyOps::compare`; only `Ordering::Equal` is
//!   consulted, never the order itself.
//! - Bucket count starts at 257 and only ever grows. Removals shrink the
//!   entry count, never the bucket array.
//! - After every successful insert, `len / bucket_count <= 0.7`, unless a
//!   resize was refused.
//!
//! Ownership
//! - A bucket head and each entry's `next` are arena keys, not pointers.
//!   Rehash rewrites those keys; entries are never reallocated.
//! - Values leave the table only through the caller: `insert` returns the
//!   overwritten value, `remove` returns the removed one, and the `*_with`
//!   variants hand each value to a disposal closure exactly once.
//! - Teardown consumes the table, so a destroyed table cannot be used.
//!
//! Failure model
//! - Each operation returns its own `Result`; no error state survives a
//!   call.
//! - `NotFound`: lookup/removal without a match. The table is unchanged.
//! - `Allocation`: creating the bucket array failed, or a new entry would
//!   exceed the configured entry budget. The table is unchanged.
//! - A resize that cannot allocate (or hits the bucket ceiling) is not
//!   reported to the inserting caller: the insert already succeeded, and
//!   the table keeps working above its target load factor.
//!
//! Hasher and rehashing invariants
//! - Each entry caches the `u64` its key hashed to on insert. Rehash uses
//!   the cached value, so `KeyOps` never runs while chains are rebuilt.
//!
//! Reentrancy
//! - `KeyOps::hash/compare` run while a chain is being walked. Debug builds
//!   panic if they re-enter the same table; release builds do not check.
//!
//! Notes and non-goals
//! - No ordered iteration; `iter` walks buckets in index order.
//! - No persistence and no cryptographic hashing; callers pick the hash
//!   quality through their `KeyOps`.

mod chained_hash_table;
pub mod config;
pub mod error;
mod guard;
pub mod ops;
mod store;
pub mod tagged;
mod table_proptest;

// Public surface
pub use chained_hash_table::{ChainedHashTable, TableStats};
pub use config::{ConfigError, TableConfig, INITIAL_BUCKETS, MAX_LOAD_FACTOR};
pub use error::{AllocFailure, Status, TableError};
pub use ops::{string_hash, FnOps, HasherOps, KeyOps, StrOps};
pub use tagged::{TaggedOps, TaggedValue};
