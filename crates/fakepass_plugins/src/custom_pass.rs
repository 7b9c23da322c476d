//! Adapter between a pipeline's custom pass slot and the injector.
//!
//! The host pipeline owns one [`InjectorPass`] per injection point it wants
//! to expose. Each lifecycle call resolves the injector, then forwards to it
//! with the pass's own injection point. Without an injector every call is a
//! no-op.

use fakepass_core::{DispatchReport, Injector, Pipeline};
use fakepass_system::server::Server;

/// A pipeline custom pass that forwards its lifecycle to an [`Injector`].
///
/// # Injector Resolution
///
/// An injector set with [`with_injector`](Self::with_injector) always wins.
/// Otherwise, if auto-find is enabled, the first lifecycle call looks the
/// injector up among the server's APIs and keeps the handle.
pub struct InjectorPass<P: Pipeline> {
    point: P::InjectionPoint,
    injector: Option<Injector<P>>,
    auto_find_injector: bool,
}

impl<P: Pipeline> InjectorPass<P> {
    /// Creates a pass for `point` with no injector and auto-find disabled.
    #[must_use]
    pub fn new(point: P::InjectionPoint) -> Self {
        Self {
            point,
            injector: None,
            auto_find_injector: false,
        }
    }

    /// Sets the injector explicitly.
    #[must_use]
    pub fn with_injector(mut self, injector: Injector<P>) -> Self {
        self.injector = Some(injector);
        self
    }

    /// Enables looking the injector up on the server.
    #[must_use]
    pub fn with_auto_find_injector(mut self, enabled: bool) -> Self {
        self.auto_find_injector = enabled;
        self
    }

    /// The injection point this pass dispatches.
    #[must_use]
    pub fn point(&self) -> P::InjectionPoint {
        self.point
    }

    /// The resolved injector, if any.
    #[must_use]
    pub fn injector(&self) -> Option<&Injector<P>> {
        self.injector.as_ref()
    }

    /// Resolves the injector from the server if none is set and auto-find is
    /// enabled.
    pub fn find_injector(&mut self, server: &Server) -> Option<&Injector<P>> {
        if self.injector.is_none() && self.auto_find_injector {
            self.injector = server.api::<Injector<P>>().cloned();
            if self.injector.is_some() {
                tracing::debug!(point = ?self.point, "injector pass found injector");
            }
        }
        self.injector.as_ref()
    }

    /// Forwards the pipeline's Setup call.
    pub fn setup(
        &mut self,
        server: &Server,
        render_context: &P::RenderContext,
        command_buffer: &mut P::CommandBuffer,
    ) -> Option<DispatchReport> {
        let point = self.point;
        let injector = self.find_injector(server)?;
        Some(injector.on_setup(point, render_context, command_buffer))
    }

    /// Forwards the pipeline's Execute call.
    pub fn execute(
        &mut self,
        server: &Server,
        pass_context: &mut P::PassContext,
    ) -> Option<DispatchReport> {
        let point = self.point;
        let injector = self.find_injector(server)?;
        Some(injector.on_execute(point, pass_context))
    }

    /// Forwards the pipeline's Cleanup call.
    pub fn cleanup(&mut self, server: &Server) -> Option<DispatchReport> {
        let point = self.point;
        let injector = self.find_injector(server)?;
        Some(injector.on_cleanup(point))
    }
}
