#![cfg(test)]

// Property tests for ChainedHashTable kept inside the crate so they can
// check bucket-level shape through `stats()` alongside the public protocol.

use crate::chained_hash_table::ChainedHashTable;
use crate::config::TableConfig;
use crate::error::TableError;
use crate::ops::{KeyOps, StrOps};
use core::cmp::Ordering;
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations so failing cases shrink toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Get(usize),
    Remove(usize),
    RemoveWith(usize),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            1 => (idx.clone()).prop_map(Op::Get),
            1 => (idx.clone()).prop_map(Op::Remove),
            1 => (idx.clone()).prop_map(Op::RemoveWith),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Every key lands in one chain.
#[derive(Clone, Copy, Debug, Default)]
struct Collide;

impl KeyOps<String> for Collide {
    fn hash(&self, _: &String) -> u64 {
        4
    }
    fn compare(&self, a: &String, b: &String) -> Ordering {
        a.cmp(b)
    }
}

// Runs an op sequence against the table and a std HashMap model.
// Invariants checked after every op:
// - `len` parity with the model; `get` parity for the touched key.
// - Overwrite returns the previous value and leaves `len` unchanged.
// - `remove` returns the model's value; absent keys yield NotFound.
// - `remove_with` calls its closure once on success, never on NotFound.
// - `iter` yields each live key exactly once.
// - Load bound holds after every successful insert; bucket count never
//   shrinks.
fn run<O: KeyOps<String>>(
    mut sut: ChainedHashTable<String, i32, O>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut buckets = sut.bucket_count();
    let disposed = Cell::new(0usize);

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let prev = sut.insert(k.clone(), v).expect("unbounded insert");
                prop_assert_eq!(prev, model.insert(k, v));
                prop_assert!(sut.load_factor() <= sut.config().max_load_factor);
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k).ok(), model.get(k));
                prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
            }
            Op::Remove(i) => {
                let k = &pool[i];
                match model.remove(k) {
                    Some(mv) => {
                        prop_assert_eq!(sut.remove(k), Ok(mv));
                    }
                    None => {
                        prop_assert_eq!(sut.remove(k), Err(TableError::NotFound));
                    }
                }
                prop_assert_eq!(sut.get(k), Err(TableError::NotFound));
            }
            Op::RemoveWith(i) => {
                let k = &pool[i];
                let before = disposed.get();
                let res = sut.remove_with(k, |_| disposed.set(disposed.get() + 1));
                match model.remove(k) {
                    Some(_) => {
                        prop_assert!(res.is_ok());
                        prop_assert_eq!(disposed.get(), before + 1);
                    }
                    None => {
                        prop_assert_eq!(res, Err(TableError::NotFound));
                        prop_assert_eq!(disposed.get(), before);
                    }
                }
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Ok(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (Err(TableError::NotFound), None) => {}
                    (s, m) => {
                        prop_assert!(false, "get_mut mismatch: {:?} vs {:?}", s, m);
                    }
                }
            }
            Op::Iterate => {
                let seen: Vec<&String> = sut.iter().map(|(k, _)| k).collect();
                let s_keys: BTreeSet<&String> = seen.iter().copied().collect();
                prop_assert_eq!(seen.len(), s_keys.len(), "iter repeated a key");
                let m_keys: BTreeSet<&String> = model.keys().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.bucket_count() >= buckets, "bucket count shrank");
        buckets = sut.bucket_count();
    }

    let stats = sut.stats();
    prop_assert_eq!(stats.len, model.len());
    let remaining = Cell::new(0usize);
    sut.teardown_with(|_| remaining.set(remaining.get() + 1));
    prop_assert_eq!(remaining.get(), model.len());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut = ChainedHashTable::new(StrOps).unwrap();
        run(sut, &pool, ops)?;
    }

    // Tiny table so resizes happen constantly.
    #[test]
    fn prop_state_machine_small_table((pool, ops) in arb_scenario()) {
        let cfg = TableConfig::default().with_initial_buckets(1);
        let sut = ChainedHashTable::with_config(StrOps, cfg).unwrap();
        run(sut, &pool, ops)?;
    }

    // Worst case: one chain holds everything.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainedHashTable::new(Collide).unwrap();
        run(sut, &pool, ops)?;
    }
}
