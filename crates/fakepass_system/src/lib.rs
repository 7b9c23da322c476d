//! The plugin runtime for fakepass (Layer 1).
//!
//! `fakepass_system` provides the primitives that host applications use to
//! assemble an injector and the glue around it:
//!
//! - [`api`] - API trait for capability registration
//! - [`plugin`] - Plugin trait for extensible functionality
//! - [`resource`] - Server-lifetime global resources
//! - [`server`] - Server runtime for plugin orchestration
//!
//! # Architecture
//!
//! - **Layer 1** (`fakepass_system`): plugin runtime (this crate)
//! - **Layer 2** (`fakepass_core`): pass discovery, registry and dispatch
//! - **Layer 3** (`fakepass_plugins`): tracing, injector plugin, pipeline glue
//!
//! # Example
//!
//! ```
//! use fakepass_system::plugin::Plugin;
//! use fakepass_system::resource::GlobalResource;
//! use fakepass_system::server::Server;
//!
//! #[derive(Default)]
//! struct FrameBudget { max_passes: usize }
//! impl GlobalResource for FrameBudget {}
//!
//! struct BudgetPlugin;
//!
//! impl Plugin for BudgetPlugin {
//!     fn build(&self, server: &mut Server) {
//!         server.insert_global(FrameBudget::default());
//!     }
//! }
//!
//! Server::new()
//!     .add_plugins(BudgetPlugin)
//!     .run();
//! ```

/// API trait for capability registration.
pub mod api;

/// Plugin trait for extensible functionality.
pub mod plugin;

/// Server-lifetime global resources.
pub mod resource;

/// Server runtime for plugin orchestration.
pub mod server;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::api::*;
    pub use crate::plugin::*;
    pub use crate::resource::*;
    pub use crate::server::*;
}
