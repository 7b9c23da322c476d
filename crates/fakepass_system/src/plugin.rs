//! Plugin system for extensible server functionality.
//!
//! Plugins are the unit of composition in fakepass. The injector, the
//! tracing setup and any application-specific wiring are all delivered as
//! plugins that a host adds to a [`Server`].
//!
//! # Example
//!
//! ```
//! use fakepass_system::plugin::{Plugin, PluginId};
//! use fakepass_system::resource::GlobalResource;
//! use fakepass_system::server::Server;
//!
//! struct LoggingPlugin;
//! impl Plugin for LoggingPlugin {
//!     fn build(&self, _server: &mut Server) {}
//! }
//!
//! struct PassNames(Vec<String>);
//! impl GlobalResource for PassNames {}
//!
//! struct PassNamesPlugin {
//!     names: Vec<String>,
//! }
//!
//! impl Plugin for PassNamesPlugin {
//!     fn build(&self, server: &mut Server) {
//!         server.insert_global(PassNames(self.names.clone()));
//!     }
//!
//!     fn dependencies(&self) -> Vec<PluginId> {
//!         vec![PluginId::of::<LoggingPlugin>()]
//!     }
//! }
//!
//! Server::new()
//!     .add_plugins(LoggingPlugin)
//!     .add_plugins(PassNamesPlugin { names: vec!["outline".into()] })
//!     .run();
//! ```

use core::any::TypeId;

use crate::server::Server;

// ─────────────────────────────────────────────────────────────────────────────
// PluginId
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a plugin type.
///
/// Used for dependency resolution and duplicate detection. Based on [`TypeId`],
/// so each plugin type has exactly one `PluginId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PluginId {
    /// Creates a `PluginId` for the given plugin type.
    #[must_use]
    pub fn of<P: Plugin>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: core::any::type_name::<P>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for debugging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugin Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of functionality added to a [`Server`].
///
/// Plugins follow a strict lifecycle managed by the server:
///
/// 1. **Build Phase** - `build()` is called in dependency order
/// 2. **Ready Phase** - `ready()` is called in dependency order
/// 3. **Cleanup Phase** - `cleanup()` is called in reverse dependency order
pub trait Plugin: Send + Sync + 'static {
    /// Configures the server. Called once when the server is finished.
    ///
    /// Use this to insert APIs and global resources. Keep it lightweight.
    fn build(&self, server: &mut Server);

    /// Called after all plugins have been built.
    ///
    /// Use this for validation that depends on other plugins, or for
    /// installing process-wide state such as a tracing subscriber.
    fn ready(&self, _server: &mut Server) {}

    /// Called when the server is shutting down.
    ///
    /// Called in **reverse** dependency order (dependents cleanup before dependencies).
    fn cleanup(&self, _server: &mut Server) {}

    /// Returns the plugin's name for debugging and error messages.
    ///
    /// Default implementation returns the type name.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Declares plugins that must be added before this one.
    ///
    /// The server will panic if dependencies are not satisfied when `finish()` is called.
    fn dependencies(&self) -> Vec<PluginId> {
        Vec::new()
    }

    /// Returns true if this plugin can only be added once.
    ///
    /// Default is `true`; adding the same plugin type twice will panic.
    fn is_unique(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugins Trait (for add_plugins polymorphism)
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for types that can be added to a server as plugins.
///
/// This trait enables `server.add_plugins()` to accept both single plugins
/// and plugin groups built with [`PluginGroupBuilder`].
pub trait Plugins {
    /// Adds these plugins to the server.
    fn add_to_server(self, server: &mut Server);
}

impl<P: Plugin> Plugins for P {
    fn add_to_server(self, server: &mut Server) {
        // Capture PluginId while we still have the concrete type
        let id = PluginId::of::<P>();
        server.add_plugin_boxed(id, Box::new(self));
    }
}

impl Plugins for PluginGroupBuilder {
    fn add_to_server(self, server: &mut Server) {
        for boxed in self.plugins {
            server.add_plugin_boxed(boxed.id, boxed.plugin);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginGroup Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A collection of plugins that can be added together.
///
/// ```ignore
/// Server::new()
///     .add_plugins(
///         DefaultPlugins::<Hdrp>::default()
///             .build()
///             .disable::<TracingPlugin>()
///     )
///     .run();
/// ```
pub trait PluginGroup {
    /// Returns the plugins in this group.
    fn build(self) -> PluginGroupBuilder;
}

/// A boxed plugin with its captured [`PluginId`].
pub(crate) struct BoxedPlugin {
    pub(crate) id: PluginId,
    pub(crate) plugin: Box<dyn Plugin>,
}

impl BoxedPlugin {
    pub(crate) fn name(&self) -> &str {
        self.plugin.name()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginGroupBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for customizing plugin groups.
///
/// Plugins keep the order they were added in; `disable` drops one by type.
#[derive(Default)]
pub struct PluginGroupBuilder {
    pub(crate) plugins: Vec<BoxedPlugin>,
}

impl PluginGroupBuilder {
    /// Creates a new empty plugin group builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Adds a plugin to the end of the group.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "This is a builder method, not std::ops::Add"
    )]
    pub fn add<P: Plugin>(mut self, plugin: P) -> Self {
        self.plugins.push(BoxedPlugin {
            id: PluginId::of::<P>(),
            plugin: Box::new(plugin),
        });
        self
    }

    /// Removes a plugin from the group by type.
    ///
    /// If the plugin is not found, this is a no-op.
    #[must_use]
    pub fn disable<P: Plugin>(mut self) -> Self {
        let target_name = core::any::type_name::<P>();
        self.plugins.retain(|p| p.name() != target_name);
        self
    }

    /// Returns the number of plugins in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if the group contains no plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PluginA;
    impl Plugin for PluginA {
        fn build(&self, _server: &mut Server) {}
    }

    struct PluginB;
    impl Plugin for PluginB {
        fn build(&self, _server: &mut Server) {}
        fn dependencies(&self) -> Vec<PluginId> {
            vec![PluginId::of::<PluginA>()]
        }
    }

    struct PluginC;
    impl Plugin for PluginC {
        fn build(&self, _server: &mut Server) {}
    }

    fn names(builder: &PluginGroupBuilder) -> Vec<&str> {
        builder.plugins.iter().map(BoxedPlugin::name).collect()
    }

    #[test]
    fn plugin_id_equality() {
        assert_eq!(PluginId::of::<PluginA>(), PluginId::of::<PluginA>());
        assert_ne!(PluginId::of::<PluginA>(), PluginId::of::<PluginB>());
    }

    #[test]
    fn plugin_defaults() {
        let plugin = PluginA;
        assert!(plugin.name().contains("PluginA"));
        assert!(plugin.is_unique());
        assert!(plugin.dependencies().is_empty());
    }

    #[test]
    fn plugin_with_dependencies() {
        let deps = PluginB.dependencies();
        assert_eq!(deps, vec![PluginId::of::<PluginA>()]);
    }

    #[test]
    fn group_builder_disable() {
        let builder = PluginGroupBuilder::new()
            .add(PluginA)
            .add(PluginC)
            .disable::<PluginA>();

        assert_eq!(builder.len(), 1);
        assert!(names(&builder)[0].contains("PluginC"));

        let empty = builder.disable::<PluginC>();
        assert!(empty.is_empty());
    }
}
