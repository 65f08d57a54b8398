//! Re-entry tracking for walks over containers that may contain themselves.
//!
//! Lists and mappings alias on clone, so `a.append(a)` builds a cycle. A
//! recursive walk (rendering, equality, ordering) enters a guard for each
//! container it descends into and treats re-entry specially instead of
//! recursing forever.

use std::cell::RefCell;

use rustc_hash::FxHashSet;

/// Which recursive walk a guard belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Walk {
    Render,
    Equality,
    Ordering,
}

type WalkKey = (Walk, usize, usize);

thread_local! {
    static ACTIVE: RefCell<FxHashSet<WalkKey>> = RefCell::new(FxHashSet::default());
}

/// Marks a container (or a pair of containers) as being visited by a walk
/// until dropped.
pub(crate) struct CycleGuard {
    key: WalkKey,
}

impl CycleGuard {
    /// Enter `left` (and `right`, for pairwise walks; pass 0 otherwise).
    ///
    /// Returns `None` when the same walk is already visiting them further up
    /// the stack.
    pub(crate) fn enter(walk: Walk, left: usize, right: usize) -> Option<Self> {
        let key = (walk, left, right);
        let fresh = ACTIVE.with(|active| active.borrow_mut().insert(key));
        fresh.then_some(CycleGuard { key })
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown.
        let _ = ACTIVE.try_with(|active| active.borrow_mut().remove(&self.key));
    }
}
