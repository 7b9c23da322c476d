//! Stage callbacks injected into a render pipeline without subclassing its
//! pass types.
//!

pub use fakepass_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use fakepass_internal::prelude::*;
}
