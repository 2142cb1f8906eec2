//! TaggedValue: the uniform key/value cell for untyped embedding code.
//!
//! A cell holds a signed integer, a float, or an opaque pointer. Pointers are
//! never dereferenced by this crate; whoever stored one owns what it points
//! to and is responsible for releasing it (see `remove_with` and
//! `teardown_with` on the table).

use crate::ops::KeyOps;
use core::cmp::Ordering;
use core::fmt;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TaggedValue {
    Int(i64),
    Float(f64),
    Ptr(*const ()),
}

impl TaggedValue {
    pub fn from_ptr<T>(p: *const T) -> Self {
        TaggedValue::Ptr(p.cast())
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            TaggedValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            TaggedValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_ptr<T>(&self) -> Option<*const T> {
        match *self {
            TaggedValue::Ptr(p) => Some(p.cast()),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            TaggedValue::Int(_) => 0,
            TaggedValue::Float(_) => 1,
            TaggedValue::Ptr(_) => 2,
        }
    }

    fn payload_bits(&self) -> u64 {
        match *self {
            TaggedValue::Int(i) => i as u64,
            TaggedValue::Float(f) => f.to_bits(),
            TaggedValue::Ptr(p) => p as usize as u64,
        }
    }
}

impl Default for TaggedValue {
    fn default() -> Self {
        TaggedValue::Int(0)
    }
}

impl From<i64> for TaggedValue {
    fn from(i: i64) -> Self {
        TaggedValue::Int(i)
    }
}

impl From<f64> for TaggedValue {
    fn from(f: f64) -> Self {
        TaggedValue::Float(f)
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TaggedValue::Int(i) => write!(f, "{i}"),
            TaggedValue::Float(x) => write!(f, "{x:.6}"),
            TaggedValue::Ptr(p) => write!(f, "{p:p}"),
        }
    }
}

/// Ops for `TaggedValue` keys. Cells of different kinds never compare equal;
/// floats compare by `total_cmp`, so `NaN` keys are usable and `-0.0` is
/// distinct from `0.0`.
#[derive(Copy, Clone, Debug, Default)]
pub struct TaggedOps;

impl KeyOps<TaggedValue> for TaggedOps {
    fn hash(&self, key: &TaggedValue) -> u64 {
        // splitmix64 finalizer over the payload, salted by kind.
        let mut z = key
            .payload_bits()
            .wrapping_add(u64::from(key.rank()).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn compare(&self, a: &TaggedValue, b: &TaggedValue) -> Ordering {
        match (a, b) {
            (TaggedValue::Int(x), TaggedValue::Int(y)) => x.cmp(y),
            (TaggedValue::Float(x), TaggedValue::Float(y)) => x.total_cmp(y),
            (TaggedValue::Ptr(x), TaggedValue::Ptr(y)) => (*x as usize).cmp(&(*y as usize)),
            _ => a.rank().cmp(&b.rank()),
        }
    }
}
