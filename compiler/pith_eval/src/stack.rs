//! Stack growth for deeply recursive evaluation.
//!
//! Every statement is executed through `ensure_sufficient_stack`, so deep
//! script recursion grows the native stack instead of overflowing it. The
//! call depth limit on `Interpreter` is what turns runaway recursion into a
//! `RecursionError`.

/// Ensure sufficient stack space is available before executing `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available.
    const RED_ZONE: usize = 128 * 1024;

    /// Stack space to allocate when growing.
    const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
