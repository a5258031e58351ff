//! std / loom switch for the synchronization primitives.
//!
//! The cursors and the shared-core handle are the only synchronization
//! state in the crate. With the `loom` feature enabled they run on loom's
//! model-checking implementations so the interleaving tests can explore
//! every permutation; production builds compile straight to std.

#[cfg(not(feature = "loom"))]
pub mod atomic {
    pub use std::sync::atomic::{AtomicUsize, Ordering};
}

#[cfg(feature = "loom")]
pub mod atomic {
    pub use loom::sync::atomic::{AtomicUsize, Ordering};
}

#[cfg(not(feature = "loom"))]
pub mod sync {
    pub use std::sync::Arc;
}

#[cfg(feature = "loom")]
pub mod sync {
    pub use loom::sync::Arc;
}
