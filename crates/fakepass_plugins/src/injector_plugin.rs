//! Plugin that owns the process-wide [`Injector`] for a pipeline.

use core::marker::PhantomData;
use fakepass_core::{Injector, Pipeline};
use fakepass_system::plugin::Plugin;
use fakepass_system::server::Server;

/// Inserts an [`Injector<P>`] API during `build()` and empties it on
/// `cleanup()`.
///
/// # APIs Provided
///
/// | API | Description |
/// |-----|-------------|
/// | [`Injector<P>`] | Fake pass registry and dispatcher |
///
/// # Example
///
/// ```ignore
/// let mut server = Server::new();
/// server.add_plugins(InjectorPlugin::<Hdrp>::new());
/// server.finish();
///
/// let injector = server.api::<Injector<Hdrp>>().expect("InjectorPlugin added");
/// injector.add(&outline);
/// ```
pub struct InjectorPlugin<P: Pipeline> {
    injector: Option<Injector<P>>,
    _pipeline: PhantomData<fn() -> P>,
}

impl<P: Pipeline> InjectorPlugin<P> {
    /// Creates a plugin that builds a fresh injector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            injector: None,
            _pipeline: PhantomData,
        }
    }

    /// Creates a plugin that publishes an existing injector handle.
    #[must_use]
    pub fn with_injector(injector: Injector<P>) -> Self {
        Self {
            injector: Some(injector),
            _pipeline: PhantomData,
        }
    }
}

impl<P: Pipeline> Default for InjectorPlugin<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pipeline> Plugin for InjectorPlugin<P> {
    fn build(&self, server: &mut Server) {
        let injector = self.injector.clone().unwrap_or_default();
        server.insert_api(injector);
    }

    fn ready(&self, server: &mut Server) {
        if let Some(injector) = server.api::<Injector<P>>() {
            tracing::debug!(
                pipeline = core::any::type_name::<P>(),
                sources = injector.source_count(),
                "fake pass injector ready"
            );
        }
    }

    fn cleanup(&self, server: &mut Server) {
        if let Some(injector) = server.api::<Injector<P>>() {
            injector.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    struct Point;

    struct Mock;

    impl Pipeline for Mock {
        type InjectionPoint = Point;
        type RenderContext = ();
        type CommandBuffer = ();
        type PassContext = ();
    }

    #[test]
    fn build_inserts_injector_api() {
        let mut server = Server::new();
        server.add_plugins(InjectorPlugin::<Mock>::new());
        server.finish();

        assert!(server.contains_api::<Injector<Mock>>());
    }

    #[test]
    fn with_injector_shares_existing_registry() {
        let injector = Injector::<Mock>::new();
        let mut server = Server::new();
        server.add_plugins(InjectorPlugin::with_injector(injector.clone()));
        server.finish();

        let published = server
            .api::<Injector<Mock>>()
            .expect("injector should be published");
        assert!(published.same_registry(&injector));
    }
}
