//! The injector: registration, removal and ordered dispatch.
//!
//! The [`Injector`] is the one integration point between a host pipeline and
//! every fake pass source. Sources are added once, their validated methods
//! are stored per `(stage, point)`, and the pipeline notifies the injector
//! through [`on_setup`](Injector::on_setup), [`on_execute`](Injector::on_execute)
//! and [`on_cleanup`](Injector::on_cleanup).
//!
//! # Thread Safety
//!
//! One [`Mutex`] guards the registered-source set and all buckets together.
//! Dispatch clones the bucket's records under the lock and invokes them after
//! releasing it, so a callback may add or remove sources. Such changes apply
//! from the next dispatch.
//!
//! # Failure Isolation
//!
//! Each callback runs under [`catch_unwind`](std::panic::catch_unwind). A
//! panicking callback, or one whose source has been dropped, is reported and
//! the rest of the bucket still runs.
//!
//! # Example
//!
//! ```ignore
//! let injector = Injector::<Hdrp>::new();
//! let outline = Arc::new(Outline::new());
//!
//! let registration = injector.add(&outline);
//! assert!(registration.is_clean());
//!
//! injector.on_setup(Point::BeforePostProcess, &render_context, &mut cmd);
//! injector.on_execute(Point::BeforePostProcess, &mut pass_context);
//! injector.on_cleanup(Point::BeforePostProcess);
//!
//! injector.remove(&outline.source_id());
//! ```

use crate::discovery::{TableCache, discover};
use crate::error::InjectionError;
use crate::pipeline::Pipeline;
use crate::registry::{CallbackRecord, Registry};
use crate::source::{FakePass, SourceId};
use crate::stage::StageKind;
use core::any::Any;
use core::fmt;
use fakepass_system::api::API;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of [`Injector::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    source_id: SourceId,
    registered: usize,
    errors: Vec<InjectionError>,
}

impl Registration {
    /// Id of the source that was added.
    #[must_use]
    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    /// Number of callbacks appended to buckets.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Errors reported while adding, in declaration order.
    #[must_use]
    pub fn errors(&self) -> &[InjectionError] {
        &self.errors
    }

    /// Returns true if the source was rejected as already registered.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.errors
            .iter()
            .any(|error| matches!(error, InjectionError::DuplicateRegistration { .. }))
    }

    /// Returns true if no errors were reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    stage: StageKind,
    invoked: usize,
    failures: Vec<InjectionError>,
}

impl DispatchReport {
    fn new(stage: StageKind) -> Self {
        Self {
            stage,
            invoked: 0,
            failures: Vec::new(),
        }
    }

    /// Stage that was dispatched.
    #[must_use]
    pub fn stage(&self) -> StageKind {
        self.stage
    }

    /// Number of callbacks that ran to completion.
    #[must_use]
    pub fn invoked(&self) -> usize {
        self.invoked
    }

    /// Callbacks that panicked or were skipped, in bucket order.
    #[must_use]
    pub fn failures(&self) -> &[InjectionError] {
        &self.failures
    }

    /// Total number of callbacks in the dispatched bucket.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.invoked + self.failures.len()
    }

    /// Returns true if every callback ran to completion.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StageArgs
// ─────────────────────────────────────────────────────────────────────────────

/// The stage being dispatched, with its arguments.
pub enum StageArgs<'a, P: Pipeline> {
    /// Setup arguments.
    Setup {
        /// Render context handed to every callback.
        render_context: &'a P::RenderContext,
        /// Command buffer handed to every callback.
        command_buffer: &'a mut P::CommandBuffer,
    },
    /// Execute arguments.
    Execute {
        /// Pass context handed to every callback.
        pass_context: &'a mut P::PassContext,
    },
    /// Cleanup takes no arguments.
    Cleanup,
}

impl<P: Pipeline> StageArgs<'_, P> {
    /// The stage these arguments belong to.
    #[must_use]
    pub fn stage(&self) -> StageKind {
        match self {
            StageArgs::Setup { .. } => StageKind::Setup,
            StageArgs::Execute { .. } => StageKind::Execute,
            StageArgs::Cleanup => StageKind::Cleanup,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Injector
// ─────────────────────────────────────────────────────────────────────────────

struct Shared<P: Pipeline> {
    registry: Mutex<Registry<P>>,
    tables: TableCache,
}

/// Registry and dispatcher of fake pass callbacks for pipeline `P`.
///
/// Cloning is cheap and yields a handle to the same registry.
pub struct Injector<P: Pipeline> {
    shared: Arc<Shared<P>>,
}

impl<P: Pipeline> API for Injector<P> {}

impl<P: Pipeline> Clone for Injector<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P: Pipeline> Default for Injector<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pipeline> fmt::Debug for Injector<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.shared.registry.lock();
        f.debug_struct("Injector")
            .field("sources", &registry.source_count())
            .field("callbacks", &registry.total())
            .finish()
    }
}

impl<P: Pipeline> Injector<P> {
    /// Creates an empty injector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::new()),
                tables: TableCache::new(),
            }),
        }
    }

    /// Returns true if both handles refer to the same registry.
    #[must_use]
    pub fn same_registry(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Returns true if the source is registered.
    #[must_use]
    pub fn contains(&self, source_id: &SourceId) -> bool {
        self.shared.registry.lock().contains(source_id)
    }

    /// Registers a source and every valid pass method of its type.
    ///
    /// A source that is already registered is rejected with
    /// [`InjectionError::DuplicateRegistration`] and nothing else happens.
    /// Otherwise each invalid method is reported and skipped, each valid
    /// method is appended to its `(stage, point)` bucket, and the source is
    /// recorded as registered even if none of its methods were valid.
    ///
    /// The injector only keeps a weak handle to the source.
    pub fn add<T: FakePass<P>>(&self, source: &Arc<T>) -> Registration {
        let source_id = source.source_id();
        let source_name = source.source_name();

        if self.contains(&source_id) {
            return duplicate(source_id, source_name);
        }

        let table = self.shared.tables.table_for::<T, P>();
        let discovery = discover(source, &table);
        let registered = discovery.callbacks.len();

        {
            let mut registry = self.shared.registry.lock();
            // Another thread may have won the race since the check above.
            if registry.contains(&source_id) {
                drop(registry);
                return duplicate(source_id, source_name);
            }
            registry.insert(source_id.clone(), discovery.callbacks);
        }

        for error in &discovery.errors {
            tracing::error!(source = %source_id, method = ?error.method(), "{error}");
        }
        tracing::debug!(
            source = %source_id,
            name = source_name,
            registered,
            rejected = discovery.errors.len(),
            "fake pass source registered"
        );

        Registration {
            source_id,
            registered,
            errors: discovery.errors,
        }
    }

    /// Unregisters a source and drops all of its callbacks.
    ///
    /// The relative order of every other callback is preserved. Returns the
    /// number of callbacks removed; removing an unknown id is a no-op that
    /// returns zero.
    ///
    /// # Dispatches In Flight
    ///
    /// Removal only affects dispatches that start after it returns. A
    /// dispatch already running, on another thread or the one whose callback
    /// called `remove`, works on a copy of its callback list taken when it
    /// started, and still invokes the removed source's callbacks for that
    /// stage if the source is alive.
    pub fn remove(&self, source_id: &SourceId) -> usize {
        let removed = self.shared.registry.lock().remove(source_id);
        match removed {
            Some(count) => {
                tracing::debug!(source = %source_id, removed = count, "fake pass source removed");
                count
            }
            None => 0,
        }
    }

    /// Invokes every callback registered for the stage at `point`, in
    /// registration order.
    pub fn dispatch(&self, point: P::InjectionPoint, args: StageArgs<'_, P>) -> DispatchReport {
        let stage = args.stage();
        let _span = tracing::trace_span!("fakepass_dispatch", %stage, ?point).entered();

        match args {
            StageArgs::Setup {
                render_context,
                command_buffer,
            } => {
                let records = self.shared.registry.lock().setup.snapshot(&point);
                run_records(stage, &point, &records, |invoke| {
                    invoke(render_context, &mut *command_buffer)
                })
            }
            StageArgs::Execute { pass_context } => {
                let records = self.shared.registry.lock().execute.snapshot(&point);
                run_records(stage, &point, &records, |invoke| {
                    invoke(&mut *pass_context)
                })
            }
            StageArgs::Cleanup => {
                let records = self.shared.registry.lock().cleanup.snapshot(&point);
                run_records(stage, &point, &records, |invoke| invoke())
            }
        }
    }

    /// Dispatches [`StageKind::Setup`] at `point`.
    pub fn on_setup(
        &self,
        point: P::InjectionPoint,
        render_context: &P::RenderContext,
        command_buffer: &mut P::CommandBuffer,
    ) -> DispatchReport {
        self.dispatch(
            point,
            StageArgs::Setup {
                render_context,
                command_buffer,
            },
        )
    }

    /// Dispatches [`StageKind::Execute`] at `point`.
    pub fn on_execute(
        &self,
        point: P::InjectionPoint,
        pass_context: &mut P::PassContext,
    ) -> DispatchReport {
        self.dispatch(point, StageArgs::Execute { pass_context })
    }

    /// Dispatches [`StageKind::Cleanup`] at `point`.
    pub fn on_cleanup(&self, point: P::InjectionPoint) -> DispatchReport {
        self.dispatch(point, StageArgs::Cleanup)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Introspection
    // ─────────────────────────────────────────────────────────────────────

    /// Number of callbacks registered for the stage at `point`.
    #[must_use]
    pub fn callback_count(&self, stage: StageKind, point: P::InjectionPoint) -> usize {
        self.shared.registry.lock().count(stage, &point)
    }

    /// Number of registered sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.shared.registry.lock().source_count()
    }

    /// Returns true if any bucket holds a callback of the source.
    #[must_use]
    pub fn has_callbacks(&self, source_id: &SourceId) -> bool {
        self.shared.registry.lock().has_callbacks(source_id)
    }

    /// Returns true if no source is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source_count() == 0
    }

    /// Unregisters every source and drops every callback.
    ///
    /// Cached pass tables are kept.
    pub fn clear(&self) {
        self.shared.registry.lock().clear();
        tracing::debug!("fake pass injector cleared");
    }
}

fn duplicate(source_id: SourceId, source_name: &'static str) -> Registration {
    let error = InjectionError::DuplicateRegistration {
        source_id: source_id.clone(),
        source_name,
    };
    tracing::error!(source = %source_id, "{error}");
    Registration {
        source_id,
        registered: 0,
        errors: vec![error],
    }
}

/// Runs a snapshot of one bucket, isolating each callback.
fn run_records<I: fmt::Debug, F: ?Sized>(
    stage: StageKind,
    point: &I,
    records: &[Arc<CallbackRecord<F>>],
    mut call: impl FnMut(&F) -> Option<()>,
) -> DispatchReport {
    let mut report = DispatchReport::new(stage);

    for record in records {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| call(&*record.invoke)));
        let failure = match outcome {
            Ok(Some(())) => {
                report.invoked += 1;
                continue;
            }
            Ok(None) => InjectionError::SourceDropped {
                source_id: record.source_id.clone(),
                source_name: record.source_name,
                method: record.method,
                stage,
            },
            Err(payload) => InjectionError::CallbackPanicked {
                source_id: record.source_id.clone(),
                source_name: record.source_name,
                method: record.method,
                stage,
                message: panic_message(payload.as_ref()),
            },
        };

        tracing::error!(
            source = %record.source_id,
            method = record.method,
            %stage,
            ?point,
            "{failure}"
        );
        report.failures.push(failure);
    }

    report
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::PassTable;
    use crate::source::Source;

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    enum Point {
        #[default]
        Opaque,
        Post,
    }

    struct Mock;

    impl Pipeline for Mock {
        type InjectionPoint = Point;
        type RenderContext = u32;
        type CommandBuffer = Vec<String>;
        type PassContext = Vec<String>;
    }

    struct Tagged {
        id: SourceId,
        label: &'static str,
    }

    impl Tagged {
        fn new(label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id: SourceId::new(),
                label,
            })
        }

        fn setup(&self, frame: &u32, cmd: &mut Vec<String>) {
            cmd.push(format!("{}:setup:{frame}", self.label));
        }

        fn execute(&self, ctx: &mut Vec<String>) {
            ctx.push(format!("{}:execute", self.label));
        }
    }

    impl Source for Tagged {
        fn source_id(&self) -> SourceId {
            self.id.clone()
        }
    }

    impl FakePass<Mock> for Tagged {
        fn passes(table: &mut PassTable<Self, Mock>) {
            table
                .setup("setup", Point::Post, Self::setup)
                .execute("execute", Point::Post, Self::execute);
        }
    }

    #[test]
    fn add_then_contains() {
        let injector = Injector::<Mock>::new();
        let source = Tagged::new("a");

        assert!(!injector.contains(&source.source_id()));
        let registration = injector.add(&source);

        assert!(registration.is_clean());
        assert_eq!(registration.registered(), 2);
        assert!(injector.contains(&source.source_id()));
        assert_eq!(injector.source_count(), 1);
    }

    #[test]
    fn setup_receives_both_arguments() {
        let injector = Injector::<Mock>::new();
        let source = Tagged::new("a");
        injector.add(&source);

        let mut cmd = Vec::new();
        let report = injector.on_setup(Point::Post, &7, &mut cmd);

        assert_eq!(report.stage(), StageKind::Setup);
        assert_eq!(report.invoked(), 1);
        assert_eq!(cmd, vec!["a:setup:7".to_owned()]);
    }

    #[test]
    fn clones_share_the_registry() {
        let injector = Injector::<Mock>::new();
        let handle = injector.clone();
        let source = Tagged::new("a");

        handle.add(&source);

        assert!(injector.same_registry(&handle));
        assert!(injector.contains(&source.source_id()));
    }

    #[test]
    fn remove_unknown_is_noop() {
        let injector = Injector::<Mock>::new();
        assert_eq!(injector.remove(&SourceId::from_string("missing")), 0);
        assert!(injector.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let injector = Injector::<Mock>::new();
        let a = Tagged::new("a");
        let b = Tagged::new("b");
        injector.add(&a);
        injector.add(&b);

        injector.clear();

        assert!(injector.is_empty());
        assert_eq!(injector.callback_count(StageKind::Execute, Point::Post), 0);
        assert!(!injector.has_callbacks(&a.source_id()));
    }

    #[test]
    fn empty_bucket_dispatch_is_clean() {
        let injector = Injector::<Mock>::new();
        let report = injector.on_cleanup(Point::Opaque);
        assert!(report.is_clean());
        assert_eq!(report.attempted(), 0);
    }

    #[test]
    fn panic_message_from_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(3_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
