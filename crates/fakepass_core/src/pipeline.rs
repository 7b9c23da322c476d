//! The host pipeline's side of the contract.

use core::fmt::Debug;
use core::hash::Hash;

/// Describes the render pipeline an injector is attached to.
///
/// The injector never looks inside these types. It only needs the injection
/// point as a map key and the three context types to type the callbacks of
/// each stage:
///
/// | Stage | Callback arguments |
/// |-------|--------------------|
/// | Setup | `&RenderContext`, `&mut CommandBuffer` |
/// | Execute | `&mut PassContext` |
/// | Cleanup | none |
///
/// # Example
///
/// ```
/// use fakepass_core::Pipeline;
///
/// #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Point {
///     #[default]
///     AfterOpaque,
///     BeforePost,
/// }
///
/// struct Forward;
///
/// impl Pipeline for Forward {
///     type InjectionPoint = Point;
///     type RenderContext = ();
///     type CommandBuffer = Vec<String>;
///     type PassContext = Vec<String>;
/// }
/// ```
pub trait Pipeline: Send + Sync + 'static {
    /// Where in the frame a stage fires.
    ///
    /// `Default` provides the injection point used by
    /// [`StageDescriptor::default`](crate::StageDescriptor).
    type InjectionPoint: Copy + Eq + Hash + Debug + Default + Send + Sync + 'static;

    /// Render context handle handed to Setup callbacks.
    type RenderContext: 'static;

    /// Command buffer handed to Setup callbacks.
    type CommandBuffer: 'static;

    /// Per-pass context handed to Execute callbacks.
    type PassContext: 'static;
}
