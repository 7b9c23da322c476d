//! Fake pass sources and their identity.

use crate::method::PassTable;
use crate::pipeline::Pipeline;
use core::fmt;
use std::sync::Arc;

/// Identity of a registered fake pass source.
///
/// The injector tracks membership by id, not by address, so a source keeps
/// the same identity for its whole lifetime regardless of where its handle
/// lives. Ids are generated using nanoid.
///
/// Internally uses `Arc<str>` for cheap cloning (reference count bump only).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(Arc<str>);

impl SourceId {
    /// Creates a new source ID with a unique nanoid.
    #[must_use]
    pub fn new() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Creates a source ID from a specific string value.
    ///
    /// Mostly useful in tests that need stable ids.
    #[must_use]
    pub fn from_string(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source_{}", self.0)
    }
}

/// Anything that can be registered with an injector.
pub trait Source: Send + Sync + 'static {
    /// Stable identity of this source.
    fn source_id(&self) -> SourceId;

    /// Name used in diagnostics. Defaults to the type name.
    fn source_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// A source that contributes stage callbacks to a pipeline.
///
/// `passes` declares the candidate methods of the type, each tagged with a
/// [`StageDescriptor`](crate::StageDescriptor). It is called at most once per
/// type and injector; the resulting table is reused for every instance.
/// Candidates are validated against their stage's required shape when an
/// instance is added, so a mis-shaped method is reported and skipped rather
/// than rejected at compile time.
///
/// # Example
///
/// ```ignore
/// impl FakePass<Hdrp> for Outline {
///     fn passes(table: &mut PassTable<Self, Hdrp>) {
///         table
///             .setup("setup", InjectionPoint::BeforePostProcess, Self::setup)
///             .execute("execute", InjectionPoint::BeforePostProcess, Self::execute);
///     }
/// }
/// ```
pub trait FakePass<P: Pipeline>: Source + Sized {
    /// Declares this type's candidate pass methods.
    fn passes(table: &mut PassTable<Self, P>);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named {
        id: SourceId,
    }

    impl Source for Named {
        fn source_id(&self) -> SourceId {
            self.id.clone()
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(SourceId::new(), SourceId::new());
    }

    #[test]
    fn from_string_roundtrips() {
        let id = SourceId::from_string("outline");
        assert_eq!(id.as_str(), "outline");
        assert_eq!(id.to_string(), "source_outline");
    }

    #[test]
    fn source_name_defaults_to_type_name() {
        let source = Named {
            id: SourceId::new(),
        };
        assert!(source.source_name().ends_with("Named"));
    }
}
