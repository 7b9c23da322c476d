//! Server runtime for plugin orchestration.
//!
//! The [`Server`] is the explicit, process-scoped owner of everything a host
//! application wires together: APIs such as the pass injector, global
//! configuration resources, and the plugins that create them. Nothing in
//! fakepass is an ambient singleton; drivers and lifecycle glue receive a
//! `&Server` and look up what they need by type.
//!
//! # Lifecycle
//!
//! 1. **Dependency Resolution** - Validate and topologically sort plugins
//! 2. **Build Phase** - Call `plugin.build()` in dependency order
//! 3. **Ready Phase** - Call `plugin.ready()` in dependency order
//! 4. **Cleanup Phase** - Call `plugin.cleanup()` in reverse order
//!
//! # Example
//!
//! ```ignore
//! let mut server = Server::new();
//! server
//!     .add_plugins(TracingPlugin::default())
//!     .add_plugins(InjectorPlugin::<Hdrp>::default());
//! server.finish();
//!
//! let injector = server.api::<Injector<Hdrp>>().expect("injector plugin added");
//! ```

use core::any::{Any, TypeId};

use hashbrown::{HashMap, HashSet};

use crate::api::API;
use crate::plugin::{Plugin, PluginId, Plugins};
use crate::resource::{GlobalResource, Resources};

type BoxedAPI = Box<dyn Any + Send + Sync>;

/// Build progress of a [`Server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    NotStarted,
    Building,
    Built,
}

/// The plugin orchestrator.
pub struct Server {
    /// Global resources (server-lifetime, read-only after build).
    global: Resources,

    /// APIs for plugin orchestration, keyed by type.
    apis: HashMap<TypeId, BoxedAPI>,

    /// Plugins pending build (not yet sorted).
    pending_plugins: Vec<PluginEntry>,

    /// Plugins that have been built, in sorted order.
    built_plugins: Vec<PluginEntry>,

    /// Set of plugin IDs that have been added (for duplicate detection).
    plugin_ids: HashSet<PluginId>,

    build_state: BuildState,
}

/// Internal entry for a registered plugin.
struct PluginEntry {
    plugin: Box<dyn Plugin>,
    /// Cached for error messages and dependency lookup.
    name: String,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    /// Creates a new empty server.
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: Resources::new(),
            apis: HashMap::new(),
            pending_plugins: Vec::new(),
            built_plugins: Vec::new(),
            plugin_ids: HashSet::new(),
            build_state: BuildState::NotStarted,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plugin Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds one or more plugins to the server.
    ///
    /// # Panics
    ///
    /// Panics if a unique plugin is added twice.
    pub fn add_plugins<P: Plugins>(&mut self, plugins: P) -> &mut Self {
        plugins.add_to_server(self);
        self
    }

    /// Adds a boxed plugin with its captured ID.
    ///
    /// Called by [`Plugins::add_to_server`] implementations.
    pub(crate) fn add_plugin_boxed(&mut self, id: PluginId, plugin: Box<dyn Plugin>) {
        let name = plugin.name().to_string();

        if plugin.is_unique() && self.plugin_ids.contains(&id) {
            panic!(
                "Plugin '{}' is unique and was already added.\n\
                 If you intended to add this plugin multiple times, \
                 set `is_unique()` to return `false`.",
                name
            );
        }
        self.plugin_ids.insert(id);

        let entry = PluginEntry { plugin, name };

        // Plugins added while building are built immediately
        if self.build_state == BuildState::Building {
            entry.plugin.build(self);
            self.built_plugins.push(entry);
        } else {
            self.pending_plugins.push(entry);
        }
    }

    /// Returns true if a plugin of the given type has been added.
    #[must_use]
    pub fn has_plugin<P: Plugin>(&self) -> bool {
        self.plugin_ids.contains(&PluginId::of::<P>())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Global Resources
    // ─────────────────────────────────────────────────────────────────────────

    /// Inserts a global resource, returning the previous value of that type.
    pub fn insert_global<R: GlobalResource>(&mut self, resource: R) -> Option<R> {
        self.global.insert(resource)
    }

    /// Returns true if a global resource of type `R` exists.
    #[must_use]
    pub fn contains_global<R: GlobalResource>(&self) -> bool {
        self.global.contains::<R>()
    }

    /// Gets a reference to a global resource.
    #[must_use]
    pub fn get_global<R: GlobalResource>(&self) -> Option<&R> {
        self.global.get::<R>()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Access
    // ─────────────────────────────────────────────────────────────────────────

    /// Inserts an API into the server.
    ///
    /// If an API of this type already exists, it is replaced and the old value
    /// is returned.
    pub fn insert_api<A: API>(&mut self, api: A) -> Option<A> {
        let boxed: BoxedAPI = Box::new(api);
        self.apis
            .insert(TypeId::of::<A>(), boxed)
            .and_then(|old| old.downcast::<A>().ok())
            .map(|b| *b)
    }

    /// Gets a reference to an API.
    ///
    /// Returns `None` if the API doesn't exist.
    #[must_use]
    pub fn api<A: API>(&self) -> Option<&A> {
        self.apis
            .get(&TypeId::of::<A>())
            .and_then(|boxed| boxed.downcast_ref::<A>())
    }

    /// Returns true if an API of type `A` exists.
    #[must_use]
    pub fn contains_api<A: API>(&self) -> bool {
        self.apis.contains_key(&TypeId::of::<A>())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns true once [`finish()`](Self::finish) has completed.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.build_state == BuildState::Built
    }

    /// Builds all plugins and prepares the server for use.
    ///
    /// # Panics
    ///
    /// - If a plugin's dependency is not satisfied
    /// - If there is a circular dependency between plugins
    /// - If called more than once
    pub fn finish(&mut self) {
        if self.build_state != BuildState::NotStarted {
            panic!("Server::finish() was already called. Cannot build twice.");
        }

        let sorted_plugins = self.sort_plugins_by_dependencies();

        self.build_state = BuildState::Building;
        for entry in sorted_plugins {
            entry.plugin.build(self);
            self.built_plugins.push(entry);
        }

        // ready() takes &mut Server, so the built list is detached while it runs.
        let mut built = core::mem::take(&mut self.built_plugins);
        for entry in &built {
            entry.plugin.ready(self);
        }
        built.append(&mut self.built_plugins);
        self.built_plugins = built;

        self.build_state = BuildState::Built;
    }

    /// Convenience alias for [`finish()`](Self::finish).
    pub fn run(&mut self) {
        self.finish();
    }

    /// Cleans up all plugins in reverse dependency order.
    pub fn cleanup(&mut self) {
        let built = core::mem::take(&mut self.built_plugins);
        for entry in built.iter().rev() {
            entry.plugin.cleanup(self);
        }
        self.built_plugins = built;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal: Dependency Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Sorts pending plugins by dependencies using Kahn's algorithm.
    ///
    /// # Panics
    ///
    /// - If a plugin's dependency is not found
    /// - If there is a circular dependency
    fn sort_plugins_by_dependencies(&mut self) -> Vec<PluginEntry> {
        if self.pending_plugins.is_empty() {
            return Vec::new();
        }

        let mut name_to_index: HashMap<String, usize> = HashMap::new();
        for (i, entry) in self.pending_plugins.iter().enumerate() {
            name_to_index.insert(entry.name.clone(), i);
        }

        let n = self.pending_plugins.len();
        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, entry) in self.pending_plugins.iter().enumerate() {
            for dep_id in entry.plugin.dependencies() {
                let dep_name = dep_id.type_name();

                if let Some(&dep_idx) = name_to_index.get(dep_name) {
                    dependents[dep_idx].push(i);
                    in_degree[i] += 1;
                } else if !self.built_plugins.iter().any(|p| p.name == dep_name) {
                    panic!(
                        "Plugin '{}' requires '{}' which was not added.\n\
                         Add {} before {}, or use a plugin group that includes it.",
                        entry.name, dep_name, dep_name, entry.name
                    );
                }
            }
        }

        // Reverse so that independent plugins keep their insertion order.
        let mut queue: Vec<usize> = (0..n).rev().filter(|&i| in_degree[i] == 0).collect();
        let mut sorted_indices: Vec<usize> = Vec::with_capacity(n);

        while let Some(idx) = queue.pop() {
            sorted_indices.push(idx);

            for &dependent_idx in dependents[idx].iter().rev() {
                in_degree[dependent_idx] -= 1;
                if in_degree[dependent_idx] == 0 {
                    queue.push(dependent_idx);
                }
            }
        }

        if sorted_indices.len() != n {
            let in_cycle: Vec<&str> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, deg)| **deg > 0)
                .map(|(i, _)| self.pending_plugins[i].name.as_str())
                .collect();

            panic!(
                "Circular dependency detected among plugins: {:?}\n\
                 Break the cycle by extracting shared functionality into a separate plugin.",
                in_cycle
            );
        }

        let mut slots: Vec<Option<PluginEntry>> = core::mem::take(&mut self.pending_plugins)
            .into_iter()
            .map(Some)
            .collect();

        sorted_indices
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        label: &'static str,
        log: Log,
        deps: Vec<PluginId>,
    }

    impl Recorder {
        fn push(&self, phase: &str) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", phase, self.label));
        }
    }

    struct First(Recorder);
    impl Plugin for First {
        fn build(&self, _server: &mut Server) {
            self.0.push("build");
        }
        fn ready(&self, _server: &mut Server) {
            self.0.push("ready");
        }
        fn cleanup(&self, _server: &mut Server) {
            self.0.push("cleanup");
        }
    }

    struct Second(Recorder);
    impl Plugin for Second {
        fn build(&self, _server: &mut Server) {
            self.0.push("build");
        }
        fn ready(&self, _server: &mut Server) {
            self.0.push("ready");
        }
        fn cleanup(&self, _server: &mut Server) {
            self.0.push("cleanup");
        }
        fn dependencies(&self) -> Vec<PluginId> {
            self.0.deps.clone()
        }
    }

    fn recorder(label: &'static str, log: &Log, deps: Vec<PluginId>) -> Recorder {
        Recorder {
            label,
            log: Arc::clone(log),
            deps,
        }
    }

    struct Counter(usize);
    impl API for Counter {}

    struct Label(&'static str);
    impl GlobalResource for Label {}

    #[test]
    fn dependencies_build_first_and_cleanup_last() {
        let log: Log = Arc::default();
        let mut server = Server::new();

        // Added in the "wrong" order on purpose.
        server.add_plugins(Second(recorder(
            "second",
            &log,
            vec![PluginId::of::<First>()],
        )));
        server.add_plugins(First(recorder("first", &log, Vec::new())));
        server.finish();
        server.cleanup();

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                "build:first",
                "build:second",
                "ready:first",
                "ready:second",
                "cleanup:second",
                "cleanup:first",
            ]
        );
    }

    #[test]
    fn api_insert_and_lookup() {
        let mut server = Server::new();
        assert!(!server.contains_api::<Counter>());

        assert!(server.insert_api(Counter(1)).is_none());
        let old = server.insert_api(Counter(2));

        assert_eq!(old.map(|c| c.0), Some(1));
        assert_eq!(server.api::<Counter>().map(|c| c.0), Some(2));
    }

    #[test]
    fn globals_insert_and_lookup() {
        let mut server = Server::new();
        server.insert_global(Label("hdrp"));

        assert!(server.contains_global::<Label>());
        assert_eq!(server.get_global::<Label>().map(|l| l.0), Some("hdrp"));
    }

    #[test]
    fn is_built_after_finish() {
        let mut server = Server::new();
        assert!(!server.is_built());
        server.finish();
        assert!(server.is_built());
    }

    #[test]
    fn has_plugin_tracks_added_types() {
        let log: Log = Arc::default();
        let mut server = Server::new();
        server.add_plugins(First(recorder("first", &log, Vec::new())));

        assert!(server.has_plugin::<First>());
        assert!(!server.has_plugin::<Second>());
    }

    #[test]
    #[should_panic(expected = "already added")]
    fn unique_plugin_added_twice_panics() {
        let log: Log = Arc::default();
        let mut server = Server::new();
        server.add_plugins(First(recorder("a", &log, Vec::new())));
        server.add_plugins(First(recorder("b", &log, Vec::new())));
    }

    #[test]
    #[should_panic(expected = "which was not added")]
    fn missing_dependency_panics() {
        let log: Log = Arc::default();
        let mut server = Server::new();
        server.add_plugins(Second(recorder(
            "second",
            &log,
            vec![PluginId::of::<First>()],
        )));
        server.finish();
    }

    #[test]
    #[should_panic(expected = "Circular dependency")]
    fn self_dependency_panics() {
        let log: Log = Arc::default();
        let mut server = Server::new();
        server.add_plugins(Second(recorder(
            "second",
            &log,
            vec![PluginId::of::<Second>()],
        )));
        server.finish();
    }

    #[test]
    #[should_panic(expected = "already called")]
    fn finish_twice_panics() {
        let mut server = Server::new();
        server.finish();
        server.finish();
    }
}
