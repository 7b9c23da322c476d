//! Stage kinds, stage descriptors and callback shapes.
//!
//! Every fake pass method is tagged with a [`StageDescriptor`]: the injection
//! point it wants to run at and the [`StageKind`] it implements. Each stage
//! kind demands one exact callback shape:
//!
//! | Stage | Parameters | Return |
//! |-------|------------|--------|
//! | [`Setup`](StageKind::Setup) | `(RenderContext, CommandBuffer)` | `()` |
//! | [`Execute`](StageKind::Execute) | `(PassContext)` | `()` |
//! | [`Cleanup`](StageKind::Cleanup) | `()` | `()` |
//!
//! A method's actual shape is captured as a [`Signature`] when it is added to
//! a pass table, and compared against [`StageKind::required_params`] when the
//! owning source is registered.

use core::any::TypeId;
use core::fmt;

/// The stage of the pipeline's per-pass lifecycle a callback implements.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Once, before the pass is first executed.
    Setup,
    /// Every frame the pass runs.
    #[default]
    Execute,
    /// Once, when the pass is torn down.
    Cleanup,
}

impl StageKind {
    /// All stage kinds, in lifecycle order.
    pub const ALL: [StageKind; 3] = [StageKind::Setup, StageKind::Execute, StageKind::Cleanup];

    /// The exact, ordered parameter list a callback of this stage must take.
    #[must_use]
    pub const fn required_params(self) -> &'static [ParamKind] {
        match self {
            StageKind::Setup => &[ParamKind::RenderContext, ParamKind::CommandBuffer],
            StageKind::Execute => &[ParamKind::PassContext],
            StageKind::Cleanup => &[],
        }
    }

    /// The full signature a callback of this stage must have.
    #[must_use]
    pub const fn required_signature(self) -> Signature {
        Signature::new(self.required_params(), ReturnKind::Unit)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Setup => "Setup",
            StageKind::Execute => "Execute",
            StageKind::Cleanup => "Cleanup",
        };
        f.write_str(name)
    }
}

/// Where and when a fake pass method runs.
///
/// The default descriptor targets the pipeline's default injection point and
/// the [`Execute`](StageKind::Execute) stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageDescriptor<I> {
    /// Injection point the method is dispatched at.
    pub point: I,
    /// Stage the method implements.
    pub stage: StageKind,
}

impl<I> StageDescriptor<I> {
    /// Creates a descriptor for the given point and stage.
    #[must_use]
    pub const fn new(point: I, stage: StageKind) -> Self {
        Self { point, stage }
    }

    /// Shorthand for a [`Setup`](StageKind::Setup) descriptor.
    #[must_use]
    pub const fn setup(point: I) -> Self {
        Self::new(point, StageKind::Setup)
    }

    /// Shorthand for an [`Execute`](StageKind::Execute) descriptor.
    #[must_use]
    pub const fn execute(point: I) -> Self {
        Self::new(point, StageKind::Execute)
    }

    /// Shorthand for a [`Cleanup`](StageKind::Cleanup) descriptor.
    #[must_use]
    pub const fn cleanup(point: I) -> Self {
        Self::new(point, StageKind::Cleanup)
    }
}

/// A parameter a pass method can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// `&Pipeline::RenderContext`
    RenderContext,
    /// `&mut Pipeline::CommandBuffer`
    CommandBuffer,
    /// `&mut Pipeline::PassContext`
    PassContext,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::RenderContext => "RenderContext",
            ParamKind::CommandBuffer => "CommandBuffer",
            ParamKind::PassContext => "PassContext",
        };
        f.write_str(name)
    }
}

/// What a pass method returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    /// `()`
    Unit,
    /// Any other type, by name.
    Value(&'static str),
}

impl ReturnKind {
    /// Classifies the return type `R`.
    #[must_use]
    pub fn of<R: 'static>() -> Self {
        if TypeId::of::<R>() == TypeId::of::<()>() {
            ReturnKind::Unit
        } else {
            ReturnKind::Value(core::any::type_name::<R>())
        }
    }

    /// Returns true for `()`.
    #[must_use]
    pub const fn is_unit(self) -> bool {
        matches!(self, ReturnKind::Unit)
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnKind::Unit => f.write_str("()"),
            ReturnKind::Value(name) => f.write_str(name),
        }
    }
}

/// The observed shape of a pass method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Parameters after the receiver, in order.
    pub params: &'static [ParamKind],
    /// Return type.
    pub returns: ReturnKind,
}

impl Signature {
    /// Creates a signature.
    #[must_use]
    pub const fn new(params: &'static [ParamKind], returns: ReturnKind) -> Self {
        Self { params, returns }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.returns)
    }
}
