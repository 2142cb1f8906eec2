//! Hash and equality capabilities a table is parameterized over.
//!
//! A table never inspects keys itself. Bucket selection goes through
//! `KeyOps::hash` and matching goes through `KeyOps::compare`, of which only
//! `Ordering::Equal` is ever consulted.
//!
//! Contract for implementors:
//! - `hash` must be a pure function of the key's logical content. A poor
//!   distribution only costs performance.
//! - Keys that compare `Equal` must hash identically.

use core::cmp::Ordering;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

pub trait KeyOps<K: ?Sized> {
    fn hash(&self, key: &K) -> u64;
    fn compare(&self, a: &K, b: &K) -> Ordering;

    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

impl<K: ?Sized, O: KeyOps<K> + ?Sized> KeyOps<K> for &O {
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        (**self).hash(key)
    }
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (**self).compare(a, b)
    }
}

/// Multiplicative string hash: `h = h * 31 + byte` over the UTF-8 bytes,
/// wrapping on overflow.
pub fn string_hash(s: &str) -> u64 {
    s.bytes()
        .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(u64::from(b)))
}

/// String keys, hashed with [`string_hash`] and compared bytewise.
#[derive(Copy, Clone, Debug, Default)]
pub struct StrOps;

impl<K: AsRef<str> + ?Sized> KeyOps<K> for StrOps {
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        string_hash(key.as_ref())
    }
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.as_ref().cmp(b.as_ref())
    }
}

/// Closure pair adapter: a hash function and a comparator supplied at
/// construction time.
#[derive(Copy, Clone)]
pub struct FnOps<H, C> {
    hash: H,
    compare: C,
}

impl<H, C> FnOps<H, C> {
    pub fn new<K>(hash: H, compare: C) -> Self
    where
        K: ?Sized,
        H: Fn(&K) -> u64,
        C: Fn(&K, &K) -> Ordering,
    {
        Self { hash, compare }
    }
}

impl<H, C> core::fmt::Debug for FnOps<H, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnOps")
    }
}

impl<K, H, C> KeyOps<K> for FnOps<H, C>
where
    K: ?Sized,
    H: Fn(&K) -> u64,
    C: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.compare)(a, b)
    }
}

/// Adapter for ordinary `Hash + Eq` keys through a `BuildHasher`.
#[derive(Clone, Debug, Default)]
pub struct HasherOps<S = DefaultHashBuilder> {
    hasher: S,
}

impl<S> HasherOps<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }
}

impl<K, S> KeyOps<K> for HasherOps<S>
where
    K: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        // Equality only; unequal keys have no meaningful order here.
        if a == b {
            Ordering::Equal
        } else {
            Ordering::Greater
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_hash_is_polynomial() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("ab"), 97 * 31 + 98);
        assert_eq!(string_hash("first key"), string_hash(&String::from("first key")));
    }

    #[test]
    fn str_ops_accepts_owned_and_borrowed() {
        let ops = StrOps;
        let owned = String::from("k");
        assert!(KeyOps::<String>::equal(&ops, &owned, &"k".to_string()));
        assert!(KeyOps::<&str>::equal(&ops, &"k", &"k"));
        assert!(!KeyOps::<&str>::equal(&ops, &"k", &"j"));
    }

    #[test]
    fn fn_ops_forwards_to_closures() {
        let ops = FnOps::new(|_: &i64| 4, |a: &i64, b: &i64| a.cmp(b));
        assert_eq!(KeyOps::<i64>::hash(&ops, &1), 4);
        assert_eq!(KeyOps::<i64>::hash(&ops, &99), 4);
        assert!(KeyOps::<i64>::equal(&ops, &3, &3));
        assert!(!KeyOps::<i64>::equal(&ops, &3, &4));
    }

    #[test]
    fn hasher_ops_is_consistent() {
        let ops: HasherOps = HasherOps::default();
        assert_eq!(
            KeyOps::<(u32, &str)>::hash(&ops, &(1, "x")),
            KeyOps::<(u32, &str)>::hash(&ops, &(1, "x"))
        );
        assert!(KeyOps::<u8>::equal(&ops, &5, &5));
        assert!(!KeyOps::<u8>::equal(&ops, &5, &6));
    }
}
