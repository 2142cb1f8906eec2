// TaggedValue cells as keys and values.
//
// Pointer cells model caller-owned resources: the table stores the address
// and never releases it. Releasing is the job of the disposal closures.
use chained_hashtable::{ChainedHashTable, TableError, TaggedOps, TaggedValue};

fn boxed(s: &str) -> TaggedValue {
    TaggedValue::from_ptr(Box::into_raw(Box::new(s.to_string())))
}

/// Release a pointer cell created by `boxed`.
fn release(v: TaggedValue) -> String {
    let p = v.as_ptr::<String>().expect("pointer cell") as *mut String;
    // SAFETY: every pointer cell in these tests comes from `boxed` and is
    // released exactly once.
    *unsafe { Box::from_raw(p) }
}

#[test]
fn integer_keys_with_float_values() {
    let mut t = ChainedHashTable::new(TaggedOps).unwrap();
    for i in -50..50 {
        t.insert(TaggedValue::Int(i), TaggedValue::Float(i as f64 / 2.0))
            .unwrap();
    }
    assert_eq!(t.len(), 100);
    assert_eq!(
        t.get(&TaggedValue::Int(-3)).unwrap().as_float(),
        Some(-1.5)
    );
    // Same bits under a different kind is a different key.
    assert_eq!(t.get(&TaggedValue::Float(-3.0)), Err(TableError::NotFound));
}

#[test]
fn zero_payloads_are_ordinary_data() {
    let mut t = ChainedHashTable::new(TaggedOps).unwrap();
    t.insert(TaggedValue::Int(0), TaggedValue::Int(0)).unwrap();
    t.insert(TaggedValue::Ptr(core::ptr::null()), TaggedValue::Int(0))
        .unwrap();
    assert_eq!(t.len(), 2);
    assert_eq!(t.get(&TaggedValue::Int(0)), Ok(&TaggedValue::Int(0)));
    assert_eq!(
        t.get(&TaggedValue::Ptr(core::ptr::null())),
        Ok(&TaggedValue::Int(0))
    );
}

#[test]
fn pointer_values_released_by_disposal() {
    let mut t = ChainedHashTable::new(TaggedOps).unwrap();
    for i in 0..10 {
        t.insert(TaggedValue::Int(i), boxed(&format!("v{i}"))).unwrap();
    }

    let mut released = Vec::new();
    t.remove_with(&TaggedValue::Int(4), |v| released.push(release(v)))
        .unwrap();
    assert_eq!(released, vec!["v4".to_string()]);

    // Overwrite hands the old pointer back; the caller releases it.
    let old = t.insert(TaggedValue::Int(5), boxed("v5'")).unwrap();
    released.push(release(old.expect("overwrite returns previous")));

    t.teardown_with(|v| released.push(release(v)));
    released.sort();
    let mut expected: Vec<String> = (0..10).filter(|&i| i != 4).map(|i| format!("v{i}")).collect();
    expected.push("v4".to_string());
    expected.push("v5'".to_string());
    expected.sort();
    assert_eq!(released, expected);
}

#[test]
fn dump_prints_tagged_cells() {
    let mut t = ChainedHashTable::new(TaggedOps).unwrap();
    t.insert(TaggedValue::Int(7), TaggedValue::Float(0.5)).unwrap();
    let mut out = Vec::new();
    t.dump(&mut out, false).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("table: len=1 buckets=257"));
    assert!(text.contains("(Int(7) => Float(0.5))"));
}
