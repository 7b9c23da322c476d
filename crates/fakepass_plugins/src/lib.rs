//! Plugins and pipeline glue for fakepass (Layer 3).
//!
//! This crate connects the injector to a running application:
//!
//! - [`TracingPlugin`] - Logging and observability via the `tracing` crate
//! - [`InjectorPlugin`] - Publishes the [`Injector`](fakepass_core::Injector) API
//! - [`InjectorPass`] - Forwards a pipeline custom pass to the injector
//! - [`PassAttachment`] - Keeps a source registered while its owner is active
//! - [`DefaultPlugins`] - Tracing plus an injector for one pipeline
//!
//! # Example
//!
//! ```ignore
//! use fakepass_system::plugin::PluginGroup;
//! use fakepass_system::server::Server;
//! use fakepass_plugins::{DefaultPlugins, InjectorPass};
//!
//! let mut server = Server::new();
//! server.add_plugins(DefaultPlugins::<Hdrp>::new().build());
//! server.finish();
//!
//! let mut pass = InjectorPass::<Hdrp>::new(Point::BeforePostProcess)
//!     .with_auto_find_injector(true);
//! pass.execute(&server, &mut pass_context);
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`fakepass_system`): Plugin runtime
//! - **Layer 2** (`fakepass_core`): Discovery, registry and dispatch
//! - **Layer 3** (`fakepass_plugins`): Plugins and pipeline glue (this crate)

mod attachment;
mod custom_pass;
mod injector_plugin;
mod tracing_plugin;

pub use attachment::{InjectionSettings, PassAttachment};
pub use custom_pass::InjectorPass;
pub use injector_plugin::InjectorPlugin;
pub use tracing_plugin::{FAKEPASS_TARGETS, TracingConfig, TracingFormat, TracingPlugin};

use core::marker::PhantomData;
use fakepass_core::Pipeline;
use fakepass_system::plugin::{PluginGroup, PluginGroupBuilder};

/// Default plugins for an application driving pipeline `P`.
///
/// Includes:
/// - [`TracingPlugin`] - Logging and observability
/// - [`InjectorPlugin<P>`] - The injector API
///
/// # Customization
///
/// ```ignore
/// Server::new()
///     .add_plugins(
///         DefaultPlugins::<Hdrp>::new()
///             .build()
///             .disable::<TracingPlugin>()
///     )
///     .run();
/// ```
pub struct DefaultPlugins<P: Pipeline> {
    tracing: TracingPlugin,
    _pipeline: PhantomData<fn() -> P>,
}

impl<P: Pipeline> DefaultPlugins<P> {
    /// Creates the group with default tracing settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tracing: TracingPlugin::default(),
            _pipeline: PhantomData,
        }
    }

    /// Replaces the tracing plugin configuration.
    #[must_use]
    pub fn with_tracing(mut self, tracing: TracingPlugin) -> Self {
        self.tracing = tracing;
        self
    }
}

impl<P: Pipeline> Default for DefaultPlugins<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pipeline> PluginGroup for DefaultPlugins<P> {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(self.tracing)
            .add(InjectorPlugin::<P>::new())
    }
}
