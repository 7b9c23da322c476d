//! Discovery and validation of a source's pass methods.
//!
//! Each candidate of the source's [`PassTable`] is checked in two steps: the
//! return type must be `()`, then the parameter list must be exactly the one
//! its stage requires. A valid candidate is bound to a [`Weak`] handle of the
//! source and yielded as a record for its `(stage, point)` bucket. An invalid
//! candidate yields one error and is skipped.

use crate::error::InjectionError;
use crate::method::{MethodCall, PassMethod, PassTable};
use crate::pipeline::Pipeline;
use crate::registry::{BoundCallback, CallbackRecord, CleanupFn, ExecuteFn, SetupFn};
use crate::source::{FakePass, SourceId};
use crate::stage::StageKind;
use core::any::{Any, TypeId};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// What discovery found on one source.
pub(crate) struct Discovery<P: Pipeline> {
    pub(crate) callbacks: Vec<BoundCallback<P>>,
    pub(crate) errors: Vec<InjectionError>,
}

/// Validates every candidate of `table` and binds the valid ones to `source`.
pub(crate) fn discover<T, P>(source: &Arc<T>, table: &PassTable<T, P>) -> Discovery<P>
where
    T: FakePass<P>,
    P: Pipeline,
{
    let source_id = source.source_id();
    let source_name = source.source_name();
    let mut discovery = Discovery {
        callbacks: Vec::with_capacity(table.len()),
        errors: Vec::new(),
    };

    for method in table.iter() {
        match bind(source, &source_id, source_name, method) {
            Ok(callback) => discovery.callbacks.push(callback),
            Err(error) => discovery.errors.push(error),
        }
    }

    discovery
}

fn validate<T, P: Pipeline>(
    source_name: &'static str,
    method: &PassMethod<T, P>,
) -> Result<(), InjectionError> {
    let signature = method.signature();
    if !signature.returns.is_unit() {
        return Err(InjectionError::InvalidReturnType {
            source_name,
            method: method.name(),
            found: signature.returns,
        });
    }

    let stage = method.descriptor().stage;
    if signature.params != stage.required_params() {
        return Err(mismatch(source_name, method));
    }

    Ok(())
}

fn mismatch<T, P: Pipeline>(source_name: &'static str, method: &PassMethod<T, P>) -> InjectionError {
    let stage = method.descriptor().stage;
    InjectionError::SignatureMismatch {
        source_name,
        method: method.name(),
        stage,
        expected: stage.required_signature(),
        found: method.signature(),
    }
}

fn bind<T, P>(
    source: &Arc<T>,
    source_id: &SourceId,
    source_name: &'static str,
    method: &PassMethod<T, P>,
) -> Result<BoundCallback<P>, InjectionError>
where
    T: FakePass<P>,
    P: Pipeline,
{
    validate(source_name, method)?;

    let descriptor = method.descriptor();
    let weak: Weak<T> = Arc::downgrade(source);

    let callback = match (descriptor.stage, &method.call) {
        (StageKind::Setup, MethodCall::Setup(call)) => {
            let call = Arc::clone(call);
            let invoke: Box<SetupFn<P>> =
                Box::new(move |render: &P::RenderContext, cmd: &mut P::CommandBuffer| {
                    weak.upgrade().map(|source| call(&source, render, cmd))
                });
            BoundCallback::Setup(
                descriptor.point,
                CallbackRecord::new(source_id.clone(), source_name, method.name(), invoke),
            )
        }
        (StageKind::Execute, MethodCall::Execute(call)) => {
            let call = Arc::clone(call);
            let invoke: Box<ExecuteFn<P>> = Box::new(move |ctx: &mut P::PassContext| {
                weak.upgrade().map(|source| call(&source, ctx))
            });
            BoundCallback::Execute(
                descriptor.point,
                CallbackRecord::new(source_id.clone(), source_name, method.name(), invoke),
            )
        }
        (StageKind::Cleanup, MethodCall::Cleanup(call)) => {
            let call = Arc::clone(call);
            let invoke: Box<CleanupFn> =
                Box::new(move || weak.upgrade().map(|source| call(&source)));
            BoundCallback::Cleanup(
                descriptor.point,
                CallbackRecord::new(source_id.clone(), source_name, method.name(), invoke),
            )
        }
        // Parameter kinds identify the shape, so validation already rules this out.
        _ => return Err(mismatch(source_name, method)),
    };

    Ok(callback)
}

// ─────────────────────────────────────────────────────────────────────────────
// TableCache
// ─────────────────────────────────────────────────────────────────────────────

/// Pass tables by source type, built on first use.
#[derive(Default)]
pub(crate) struct TableCache {
    tables: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl TableCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the table for `T`, calling [`FakePass::passes`] if it has not
    /// been built yet.
    pub(crate) fn table_for<T, P>(&self) -> Arc<PassTable<T, P>>
    where
        T: FakePass<P>,
        P: Pipeline,
    {
        let key = TypeId::of::<T>();
        if let Some(table) = self.cached(key) {
            return table;
        }

        let mut table = PassTable::new();
        T::passes(&mut table);
        let table = Arc::new(table);

        let mut tables = self.tables.write();
        let entry = tables
            .entry(key)
            .or_insert_with(|| Arc::clone(&table) as Arc<dyn Any + Send + Sync>);
        Arc::clone(entry).downcast().unwrap_or(table)
    }

    fn cached<T, P>(&self, key: TypeId) -> Option<Arc<PassTable<T, P>>>
    where
        T: FakePass<P>,
        P: Pipeline,
    {
        let table = self.tables.read().get(&key).cloned()?;
        table.downcast().ok()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tables.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use crate::stage::ReturnKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    enum Point {
        #[default]
        Opaque,
    }

    struct Mock;

    impl Pipeline for Mock {
        type InjectionPoint = Point;
        type RenderContext = ();
        type CommandBuffer = Vec<&'static str>;
        type PassContext = Vec<&'static str>;
    }

    struct Mixed {
        id: SourceId,
    }

    impl Source for Mixed {
        fn source_id(&self) -> SourceId {
            self.id.clone()
        }
    }

    impl Mixed {
        fn setup(&self, _render: &(), cmd: &mut Vec<&'static str>) {
            cmd.push("setup");
        }

        fn execute_without_context(&self) {}

        fn cleanup_returning(&self) -> bool {
            true
        }
    }

    impl FakePass<Mock> for Mixed {
        fn passes(table: &mut PassTable<Self, Mock>) {
            table
                .setup("setup", Point::Opaque, Self::setup)
                .execute("execute_without_context", Point::Opaque, Self::execute_without_context)
                .cleanup("cleanup_returning", Point::Opaque, Self::cleanup_returning);
        }
    }

    static TABLE_BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Source for Counted {
        fn source_id(&self) -> SourceId {
            SourceId::from_string("counted")
        }
    }

    impl FakePass<Mock> for Counted {
        fn passes(table: &mut PassTable<Self, Mock>) {
            TABLE_BUILDS.fetch_add(1, Ordering::SeqCst);
            table.add_default("noop", |_: &Counted, _: &mut Vec<&'static str>| {});
        }
    }

    fn mixed() -> Arc<Mixed> {
        Arc::new(Mixed {
            id: SourceId::from_string("mixed"),
        })
    }

    #[test]
    fn discover_binds_valid_and_reports_invalid() {
        let source = mixed();
        let mut table = PassTable::new();
        Mixed::passes(&mut table);

        let discovery = discover(&source, &table);

        assert_eq!(discovery.callbacks.len(), 1);
        assert!(matches!(
            discovery.callbacks[0],
            BoundCallback::Setup(Point::Opaque, _)
        ));
        assert_eq!(discovery.errors.len(), 2);
        assert!(matches!(
            discovery.errors[0],
            InjectionError::SignatureMismatch {
                method: "execute_without_context",
                stage: StageKind::Execute,
                ..
            }
        ));
        assert!(matches!(
            discovery.errors[1],
            InjectionError::InvalidReturnType {
                method: "cleanup_returning",
                found: ReturnKind::Value("bool"),
                ..
            }
        ));
    }

    #[test]
    fn bound_callback_does_not_keep_source_alive() {
        let source = mixed();
        let mut table = PassTable::new();
        Mixed::passes(&mut table);
        let mut discovery = discover(&source, &table);

        let BoundCallback::Setup(_, record) = discovery.callbacks.remove(0) else {
            panic!("expected a setup callback");
        };

        let mut cmd = Vec::new();
        assert_eq!((record.invoke)(&(), &mut cmd), Some(()));
        assert_eq!(cmd, vec!["setup"]);

        drop(source);
        assert_eq!((record.invoke)(&(), &mut cmd), None);
        assert_eq!(cmd.len(), 1);
    }

    #[test]
    fn table_cache_builds_once_per_type() {
        let cache = TableCache::new();
        let first = cache.table_for::<Counted, Mock>();
        let second = cache.table_for::<Counted, Mock>();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(TABLE_BUILDS.load(Ordering::SeqCst), 1);

        cache.table_for::<Mixed, Mock>();
        assert_eq!(cache.len(), 2);
    }
}
