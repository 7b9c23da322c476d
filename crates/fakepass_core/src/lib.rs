//! Fake pass injection for render pipelines (Layer 2).
//!
//! `fakepass_core` lets application objects ("sources") contribute small
//! per-stage behaviours to a render pipeline without subclassing anything the
//! pipeline owns. A single [`Injector`] discovers each source's tagged
//! methods, validates their shapes, stores them per `(stage, injection point)`
//! and calls them in registration order when the pipeline reports that a
//! stage occurred.
//!
//! # Core Concepts
//!
//! - [`Pipeline`] - The host's injection point and context types
//! - [`StageKind`] / [`StageDescriptor`] - When and where a method runs
//! - [`FakePass`] / [`PassTable`] - The tagged methods a source type declares
//! - [`Injector`] - Registry and dispatcher, exposed as a server API
//! - [`InjectionError`] - What registration and dispatch report
//!
//! # Example
//!
//! ```ignore
//! use fakepass_core::prelude::*;
//!
//! struct Outline { id: SourceId }
//!
//! impl Source for Outline {
//!     fn source_id(&self) -> SourceId { self.id.clone() }
//! }
//!
//! impl Outline {
//!     fn execute(&self, ctx: &mut PassContext) { /* draw */ }
//! }
//!
//! impl FakePass<Hdrp> for Outline {
//!     fn passes(table: &mut PassTable<Self, Hdrp>) {
//!         table.execute("execute", Point::BeforePostProcess, Self::execute);
//!     }
//! }
//!
//! let injector = Injector::<Hdrp>::new();
//! let outline = Arc::new(Outline { id: SourceId::new() });
//! injector.add(&outline);
//! injector.on_execute(Point::BeforePostProcess, &mut pass_context);
//! ```
//!
//! # Architecture
//!
//! This crate is Layer 2 of the fakepass architecture:
//!
//! - **Layer 1** (`fakepass_system`): Plugin runtime (Server, Plugin, API)
//! - **Layer 2** (`fakepass_core`): Discovery, registry and dispatch (this crate)
//! - **Layer 3** (`fakepass_plugins`): Injector plugin, pipeline adapter, lifecycle glue

mod discovery;
mod registry;

/// Error types for registration and dispatch.
pub mod error;

/// The injector API.
pub mod injector;

/// Candidate pass methods and pass tables.
pub mod method;

/// The host pipeline abstraction.
pub mod pipeline;

/// Fake pass sources and their identity.
pub mod source;

/// Stage kinds, descriptors and callback shapes.
pub mod stage;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::error::InjectionError;
    pub use crate::injector::{DispatchReport, Injector, Registration, StageArgs};
    pub use crate::method::{IntoPassMethod, PassMethod, PassTable};
    pub use crate::pipeline::Pipeline;
    pub use crate::source::{FakePass, Source, SourceId};
    pub use crate::stage::{ParamKind, ReturnKind, Signature, StageDescriptor, StageKind};
}

// Re-export key types at crate root for convenience
pub use error::InjectionError;
pub use injector::{DispatchReport, Injector, Registration, StageArgs};
pub use method::{PassMethod, PassTable};
pub use pipeline::Pipeline;
pub use source::{FakePass, Source, SourceId};
pub use stage::{StageDescriptor, StageKind};
