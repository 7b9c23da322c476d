//! # fakepass Internal Library
//!
//! Re-exports the fakepass crates for convenience.

/// Layer 1: Plugin runtime.
pub use fakepass_system;

/// Layer 2: Fake pass discovery, registry and dispatch.
pub use fakepass_core;

/// Layer 3: Plugins and pipeline glue.
pub use fakepass_plugins;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use fakepass_core::prelude::*;
    pub use fakepass_plugins::{
        DefaultPlugins, InjectionSettings, InjectorPass, InjectorPlugin, PassAttachment,
        TracingConfig, TracingFormat, TracingPlugin,
    };
    pub use fakepass_system::prelude::*;
}
