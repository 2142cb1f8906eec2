//! Per-call error reporting for table operations.

use crate::config::ConfigError;
use std::collections::TryReserveError;

/// Why a required allocation was refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AllocFailure {
    /// The global allocator refused a fallible reservation.
    #[error(transparent)]
    Reserve(#[from] TryReserveError),
    /// A new entry would exceed the configured entry budget.
    #[error("entry budget of {limit} exhausted")]
    EntryBudget { limit: usize },
    /// The bucket array is already at the configured ceiling.
    #[error("bucket budget of {limit} exhausted")]
    BucketBudget { limit: usize },
}

/// Error returned by fallible table operations.
///
/// Every operation reports its own outcome; nothing carries over from one
/// call to the next.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocFailure),
    #[error("key not found")]
    NotFound,
    #[error("invalid table configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Stable outcome codes, for callers that log or compare statuses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    AllocationError,
    NotFoundError,
    ConfigError,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::AllocationError => "allocation error",
            Status::NotFoundError => "not found error",
            Status::ConfigError => "configuration error",
        }
    }

    /// Collapse any `Result` from this crate into its status code.
    pub fn of<T>(res: &Result<T, TableError>) -> Status {
        match res {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }
}

impl TableError {
    pub fn status(&self) -> Status {
        match self {
            TableError::Allocation(_) => Status::AllocationError,
            TableError::NotFound => Status::NotFoundError,
            TableError::Config(_) => Status::ConfigError,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TableError::NotFound)
    }
}

impl From<TryReserveError> for TableError {
    fn from(e: TryReserveError) -> Self {
        TableError::Allocation(AllocFailure::Reserve(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let ok: Result<(), TableError> = Ok(());
        assert_eq!(Status::of(&ok), Status::Success);

        let nf: Result<(), TableError> = Err(TableError::NotFound);
        assert_eq!(Status::of(&nf), Status::NotFoundError);
        assert!(nf.unwrap_err().is_not_found());

        let alloc = TableError::from(AllocFailure::EntryBudget { limit: 4 });
        assert_eq!(alloc.status(), Status::AllocationError);
        assert_eq!(Status::AllocationError.as_str(), "allocation error");
    }

    #[test]
    fn messages_name_the_budget() {
        let e = TableError::Allocation(AllocFailure::EntryBudget { limit: 8 });
        assert_eq!(e.to_string(), "allocation error: entry budget of 8 exhausted");
        assert_eq!(TableError::NotFound.to_string(), "key not found");
    }

    #[test]
    fn reserve_failure_converts() {
        let mut v: Vec<u64> = Vec::new();
        let err = v.try_reserve_exact(usize::MAX).unwrap_err();
        let e: TableError = err.into();
        assert!(matches!(e, TableError::Allocation(AllocFailure::Reserve(_))));
    }
}
