//! Debug-only detection of user code re-entering a table mid-walk.
//!
//! `KeyOps::hash` and `KeyOps::compare` run while the table is walking a
//! chain. A capability that reaches back into the same table from there
//! would observe a half-updated structure, so debug builds panic instead.
//! Release builds carry no state and do nothing.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Which part of the table was busy when re-entry happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Hash,
    Walk,
}

#[derive(Debug, Default)]
pub(crate) struct WalkGuard {
    #[cfg(debug_assertions)]
    busy: Cell<Option<Phase>>,
    // Keep !Send + !Sync; tables are single-threaded.
    _nosend: PhantomData<*mut ()>,
}

impl WalkGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Mark the table busy for the lifetime of the returned token.
    #[inline]
    pub(crate) fn enter(&self, phase: Phase) -> Busy<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(prev) = self.busy.replace(Some(phase)) {
                panic!("table re-entered from user code during {prev:?} (while starting {phase:?})");
            }
            return Busy { guard: self };
        }
        #[cfg(not(debug_assertions))]
        {
            let _ = phase;
            return Busy {
                _guard: PhantomData,
            };
        }
    }

    #[cfg(test)]
    pub(crate) fn is_busy(&self) -> bool {
        #[cfg(debug_assertions)]
        {
            return self.busy.get().is_some();
        }
        #[cfg(not(debug_assertions))]
        {
            return false;
        }
    }
}

pub(crate) struct Busy<'a> {
    #[cfg(debug_assertions)]
    guard: &'a WalkGuard,
    #[cfg(not(debug_assertions))]
    _guard: PhantomData<&'a WalkGuard>,
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            self.guard.busy.set(None);
        }
    }
}
