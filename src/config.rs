//! Construction-time tuning for `ChainedHashTable`.

/// Bucket count a table starts with unless configured otherwise. A prime
/// close to 256 so that keys with power-of-two structure spread out.
pub const INITIAL_BUCKETS: usize = 257;

/// Largest `len / bucket_count` ratio tolerated after an insert.
pub const MAX_LOAD_FACTOR: f64 = 0.7;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("initial bucket count must be non-zero")]
    ZeroInitialBuckets,
    #[error("max load factor must be finite and greater than zero")]
    InvalidLoadFactor,
    #[error("initial bucket count {initial} exceeds bucket ceiling {ceiling}")]
    CeilingBelowInitial { initial: usize, ceiling: usize },
}

/// Table configuration. The defaults reproduce the classic behaviour:
/// 257 buckets, 0.7 load factor, unbounded growth.
#[derive(Clone, Debug, PartialEq)]
pub struct TableConfig {
    pub initial_buckets: usize,
    pub max_load_factor: f64,
    /// Growth ceiling. Once reached, resizes are refused and the table keeps
    /// working above its target load factor.
    pub max_buckets: Option<usize>,
    /// Entry budget. Inserting a new key beyond it fails with an
    /// allocation error.
    pub max_entries: Option<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_buckets: INITIAL_BUCKETS,
            max_load_factor: MAX_LOAD_FACTOR,
            max_buckets: None,
            max_entries: None,
        }
    }
}

impl TableConfig {
    pub fn with_initial_buckets(mut self, n: usize) -> Self {
        self.initial_buckets = n;
        self
    }

    pub fn with_max_load_factor(mut self, lf: f64) -> Self {
        self.max_load_factor = lf;
        self
    }

    pub fn with_max_buckets(mut self, n: usize) -> Self {
        self.max_buckets = Some(n);
        self
    }

    pub fn with_max_entries(mut self, n: usize) -> Self {
        self.max_entries = Some(n);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_buckets == 0 {
            return Err(ConfigError::ZeroInitialBuckets);
        }
        if !self.max_load_factor.is_finite() || self.max_load_factor <= 0.0 {
            return Err(ConfigError::InvalidLoadFactor);
        }
        if let Some(ceiling) = self.max_buckets {
            if ceiling < self.initial_buckets {
                return Err(ConfigError::CeilingBelowInitial {
                    initial: self.initial_buckets,
                    ceiling,
                });
            }
        }
        Ok(())
    }

    /// True when `len` entries over `buckets` buckets breaks the load bound.
    pub(crate) fn over_threshold(&self, len: usize, buckets: usize) -> bool {
        len as f64 / buckets as f64 > self.max_load_factor
    }

    /// Pick the bucket count for the next resize: `old * 2 + 1`, repeated
    /// until `len` fits under the load bound, clamped to the ceiling.
    /// `None` means growth is impossible (ceiling reached or overflow).
    pub(crate) fn next_bucket_count(&self, len: usize, old: usize) -> Option<usize> {
        let mut next = old;
        loop {
            next = next.checked_mul(2)?.checked_add(1)?;
            if let Some(ceiling) = self.max_buckets {
                if next >= ceiling {
                    return (ceiling > old).then_some(ceiling);
                }
            }
            if !self.over_threshold(len, next) {
                return Some(next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let c = TableConfig::default();
        assert_eq!(c.initial_buckets, 257);
        assert_eq!(c.max_load_factor, 0.7);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let c = TableConfig::default().with_initial_buckets(0);
        assert_eq!(c.validate(), Err(ConfigError::ZeroInitialBuckets));

        for lf in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let c = TableConfig::default().with_max_load_factor(lf);
            assert_eq!(c.validate(), Err(ConfigError::InvalidLoadFactor));
        }

        let c = TableConfig::default().with_max_buckets(100);
        assert_eq!(
            c.validate(),
            Err(ConfigError::CeilingBelowInitial {
                initial: 257,
                ceiling: 100
            })
        );
    }

    #[test]
    fn threshold_matches_first_resize_point() {
        let c = TableConfig::default();
        // floor(257 * 0.7) = 179 entries fit, the 180th does not.
        assert!(!c.over_threshold(179, 257));
        assert!(c.over_threshold(180, 257));
    }

    #[test]
    fn growth_doubles_plus_one_and_restores_bound() {
        let c = TableConfig::default();
        assert_eq!(c.next_bucket_count(180, 257), Some(515));

        // A badly lagging table skips straight to a size that fits.
        let n = c.next_bucket_count(10_000, 257).unwrap();
        assert!(!c.over_threshold(10_000, n));
        assert!(n > 257);
    }

    #[test]
    fn growth_respects_ceiling() {
        let c = TableConfig::default().with_max_buckets(300);
        assert_eq!(c.next_bucket_count(180, 257), Some(300));
        assert_eq!(c.next_bucket_count(250, 300), None);
    }

    #[test]
    fn growth_overflow_is_refused() {
        let c = TableConfig::default().with_initial_buckets(1);
        assert_eq!(c.next_bucket_count(usize::MAX, usize::MAX / 2 + 1), None);
    }
}
