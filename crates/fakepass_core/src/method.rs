//! Candidate pass methods and per-type pass tables.
//!
//! A [`PassTable`] is the declared list of a type's candidate methods, each
//! stored with its descriptor and its observed [`Signature`]. Methods are
//! converted through [`IntoPassMethod`], which accepts the three callback
//! shapes the injector understands, with any return type:
//!
//! ```text
//! Fn(&T, &RenderContext, &mut CommandBuffer) -> R
//! Fn(&T, &mut PassContext) -> R
//! Fn(&T) -> R
//! ```
//!
//! Accepting every shape for every stage lets discovery report a method whose
//! shape does not fit its stage instead of failing to compile.

use crate::pipeline::Pipeline;
use crate::stage::{ParamKind, ReturnKind, Signature, StageDescriptor, StageKind};
use std::sync::Arc;

pub(crate) type SetupCall<T, P> = dyn Fn(&T, &<P as Pipeline>::RenderContext, &mut <P as Pipeline>::CommandBuffer)
    + Send
    + Sync;
pub(crate) type ExecuteCall<T, P> = dyn Fn(&T, &mut <P as Pipeline>::PassContext) + Send + Sync;
pub(crate) type CleanupCall<T> = dyn Fn(&T) + Send + Sync;

/// Type-erased method body, by shape. The return value is already discarded.
pub(crate) enum MethodCall<T, P: Pipeline> {
    Setup(Arc<SetupCall<T, P>>),
    Execute(Arc<ExecuteCall<T, P>>),
    Cleanup(Arc<CleanupCall<T>>),
}

/// A candidate method of a fake pass type.
pub struct PassMethod<T, P: Pipeline> {
    name: &'static str,
    descriptor: StageDescriptor<P::InjectionPoint>,
    signature: Signature,
    pub(crate) call: MethodCall<T, P>,
}

impl<T, P: Pipeline> PassMethod<T, P> {
    /// Method name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Where and when the method asks to run.
    #[must_use]
    pub fn descriptor(&self) -> StageDescriptor<P::InjectionPoint> {
        self.descriptor
    }

    /// The method's observed shape.
    #[must_use]
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Returns true if the observed shape is the one the tagged stage requires.
    #[must_use]
    pub fn matches_stage(&self) -> bool {
        self.signature == self.descriptor.stage.required_signature()
    }
}

impl<T, P: Pipeline> core::fmt::Debug for PassMethod<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PassMethod")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Conversion of a callable into a [`PassMethod`].
///
/// # Marker Types
///
/// The `Marker` type parameter allows one implementation per callback shape
/// for the same callable type.
pub trait IntoPassMethod<T, P: Pipeline, Marker>: Sized {
    /// Wraps this callable as a named, tagged candidate method.
    fn into_pass_method(
        self,
        name: &'static str,
        descriptor: StageDescriptor<P::InjectionPoint>,
    ) -> PassMethod<T, P>;
}

/// Marker for `Fn(&T, &RenderContext, &mut CommandBuffer) -> R`.
pub struct SetupShape;

/// Marker for `Fn(&T, &mut PassContext) -> R`.
pub struct ExecuteShape;

/// Marker for `Fn(&T) -> R`.
pub struct CleanupShape;

impl<T, P, F, R> IntoPassMethod<T, P, SetupShape> for F
where
    T: 'static,
    P: Pipeline,
    F: Fn(&T, &P::RenderContext, &mut P::CommandBuffer) -> R + Send + Sync + 'static,
    R: 'static,
{
    fn into_pass_method(
        self,
        name: &'static str,
        descriptor: StageDescriptor<P::InjectionPoint>,
    ) -> PassMethod<T, P> {
        const PARAMS: &[ParamKind] = &[ParamKind::RenderContext, ParamKind::CommandBuffer];
        PassMethod {
            name,
            descriptor,
            signature: Signature::new(PARAMS, ReturnKind::of::<R>()),
            call: MethodCall::Setup(Arc::new(
                move |source: &T, render: &P::RenderContext, cmd: &mut P::CommandBuffer| {
                    let _ = self(source, render, cmd);
                },
            )),
        }
    }
}

impl<T, P, F, R> IntoPassMethod<T, P, ExecuteShape> for F
where
    T: 'static,
    P: Pipeline,
    F: Fn(&T, &mut P::PassContext) -> R + Send + Sync + 'static,
    R: 'static,
{
    fn into_pass_method(
        self,
        name: &'static str,
        descriptor: StageDescriptor<P::InjectionPoint>,
    ) -> PassMethod<T, P> {
        const PARAMS: &[ParamKind] = &[ParamKind::PassContext];
        PassMethod {
            name,
            descriptor,
            signature: Signature::new(PARAMS, ReturnKind::of::<R>()),
            call: MethodCall::Execute(Arc::new(move |source: &T, ctx: &mut P::PassContext| {
                let _ = self(source, ctx);
            })),
        }
    }
}

impl<T, P, F, R> IntoPassMethod<T, P, CleanupShape> for F
where
    T: 'static,
    P: Pipeline,
    F: Fn(&T) -> R + Send + Sync + 'static,
    R: 'static,
{
    fn into_pass_method(
        self,
        name: &'static str,
        descriptor: StageDescriptor<P::InjectionPoint>,
    ) -> PassMethod<T, P> {
        PassMethod {
            name,
            descriptor,
            signature: Signature::new(&[], ReturnKind::of::<R>()),
            call: MethodCall::Cleanup(Arc::new(move |source: &T| {
                let _ = self(source);
            })),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PassTable
// ─────────────────────────────────────────────────────────────────────────────

/// The declared candidate methods of a fake pass type, in declaration order.
///
/// Declaration order is the order in which a source's callbacks are appended
/// to the injector's buckets.
pub struct PassTable<T, P: Pipeline> {
    methods: Vec<PassMethod<T, P>>,
}

impl<T, P: Pipeline> PassTable<T, P> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            methods: Vec::new(),
        }
    }

    /// Declares a candidate method with an explicit descriptor.
    pub fn add<M, Marker>(
        &mut self,
        name: &'static str,
        descriptor: StageDescriptor<P::InjectionPoint>,
        method: M,
    ) -> &mut Self
    where
        M: IntoPassMethod<T, P, Marker>,
    {
        self.methods.push(method.into_pass_method(name, descriptor));
        self
    }

    /// Declares a candidate method with the default descriptor.
    pub fn add_default<M, Marker>(&mut self, name: &'static str, method: M) -> &mut Self
    where
        M: IntoPassMethod<T, P, Marker>,
    {
        self.add(name, StageDescriptor::default(), method)
    }

    /// Declares a candidate tagged as [`StageKind::Setup`].
    pub fn setup<M, Marker>(
        &mut self,
        name: &'static str,
        point: P::InjectionPoint,
        method: M,
    ) -> &mut Self
    where
        M: IntoPassMethod<T, P, Marker>,
    {
        self.add(name, StageDescriptor::new(point, StageKind::Setup), method)
    }

    /// Declares a candidate tagged as [`StageKind::Execute`].
    pub fn execute<M, Marker>(
        &mut self,
        name: &'static str,
        point: P::InjectionPoint,
        method: M,
    ) -> &mut Self
    where
        M: IntoPassMethod<T, P, Marker>,
    {
        self.add(name, StageDescriptor::new(point, StageKind::Execute), method)
    }

    /// Declares a candidate tagged as [`StageKind::Cleanup`].
    pub fn cleanup<M, Marker>(
        &mut self,
        name: &'static str,
        point: P::InjectionPoint,
        method: M,
    ) -> &mut Self
    where
        M: IntoPassMethod<T, P, Marker>,
    {
        self.add(name, StageDescriptor::new(point, StageKind::Cleanup), method)
    }

    /// Iterates the candidates in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PassMethod<T, P>> {
        self.methods.iter()
    }

    /// Returns the number of declared candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns true if no candidates were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<T, P: Pipeline> Default for PassTable<T, P> {
    fn default() -> Self {
        Self::new()
    }
}
