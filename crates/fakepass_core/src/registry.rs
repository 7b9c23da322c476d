//! Callback buckets and the registered-source set.
//!
//! The registry keeps one bucket per stage kind. Each bucket maps an
//! injection point to an ordered list of callback records. Appending keeps
//! registration order; removal filters a source's records out in place.
//!
//! Records are reference counted so dispatch can snapshot a list under the
//! injector's lock and run it after the lock is released.

use crate::pipeline::Pipeline;
use crate::source::SourceId;
use crate::stage::StageKind;
use core::hash::Hash;
use hashbrown::{HashMap, HashSet};
use std::sync::Arc;

/// Bound Setup callback. Returns `None` if the source is gone.
pub(crate) type SetupFn<P> = dyn Fn(&<P as Pipeline>::RenderContext, &mut <P as Pipeline>::CommandBuffer) -> Option<()>
    + Send
    + Sync;

/// Bound Execute callback. Returns `None` if the source is gone.
pub(crate) type ExecuteFn<P> = dyn Fn(&mut <P as Pipeline>::PassContext) -> Option<()> + Send + Sync;

/// Bound Cleanup callback. Returns `None` if the source is gone.
pub(crate) type CleanupFn = dyn Fn() -> Option<()> + Send + Sync;

// ─────────────────────────────────────────────────────────────────────────────
// CallbackRecord
// ─────────────────────────────────────────────────────────────────────────────

/// A validated method bound to its source.
pub(crate) struct CallbackRecord<F: ?Sized> {
    pub(crate) source_id: SourceId,
    pub(crate) source_name: &'static str,
    pub(crate) method: &'static str,
    pub(crate) invoke: Box<F>,
}

impl<F: ?Sized> CallbackRecord<F> {
    pub(crate) fn new(
        source_id: SourceId,
        source_name: &'static str,
        method: &'static str,
        invoke: Box<F>,
    ) -> Self {
        Self {
            source_id,
            source_name,
            method,
            invoke,
        }
    }
}

/// A record ready to be appended, tagged with its destination.
pub(crate) enum BoundCallback<P: Pipeline> {
    Setup(P::InjectionPoint, CallbackRecord<SetupFn<P>>),
    Execute(P::InjectionPoint, CallbackRecord<ExecuteFn<P>>),
    Cleanup(P::InjectionPoint, CallbackRecord<CleanupFn>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Bucket
// ─────────────────────────────────────────────────────────────────────────────

/// Injection point to ordered callback list.
pub(crate) struct Bucket<K, F: ?Sized> {
    lists: HashMap<K, Vec<Arc<CallbackRecord<F>>>>,
}

impl<K: Eq + Hash, F: ?Sized> Bucket<K, F> {
    pub(crate) fn new() -> Self {
        Self {
            lists: HashMap::new(),
        }
    }

    /// Appends a record to the end of the point's list, creating it if needed.
    pub(crate) fn push(&mut self, point: K, record: CallbackRecord<F>) {
        self.lists.entry(point).or_default().push(Arc::new(record));
    }

    /// Clones the point's list for dispatch.
    pub(crate) fn snapshot(&self, point: &K) -> Vec<Arc<CallbackRecord<F>>> {
        self.lists.get(point).cloned().unwrap_or_default()
    }

    /// Removes every record of the source, keeping the relative order of the
    /// rest. Returns how many records were removed.
    pub(crate) fn remove_source(&mut self, source_id: &SourceId) -> usize {
        let mut removed = 0;
        self.lists.retain(|_, list| {
            let before = list.len();
            list.retain(|record| record.source_id != *source_id);
            removed += before - list.len();
            !list.is_empty()
        });
        removed
    }

    pub(crate) fn count(&self, point: &K) -> usize {
        self.lists.get(point).map_or(0, Vec::len)
    }

    pub(crate) fn contains_source(&self, source_id: &SourceId) -> bool {
        self.lists
            .values()
            .flatten()
            .any(|record| record.source_id == *source_id)
    }

    pub(crate) fn total(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    pub(crate) fn clear(&mut self) {
        self.lists.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// The registered-source set plus one bucket per stage kind.
pub(crate) struct Registry<P: Pipeline> {
    sources: HashSet<SourceId>,
    pub(crate) setup: Bucket<P::InjectionPoint, SetupFn<P>>,
    pub(crate) execute: Bucket<P::InjectionPoint, ExecuteFn<P>>,
    pub(crate) cleanup: Bucket<P::InjectionPoint, CleanupFn>,
}

impl<P: Pipeline> Registry<P> {
    pub(crate) fn new() -> Self {
        Self {
            sources: HashSet::new(),
            setup: Bucket::new(),
            execute: Bucket::new(),
            cleanup: Bucket::new(),
        }
    }

    pub(crate) fn contains(&self, source_id: &SourceId) -> bool {
        self.sources.contains(source_id)
    }

    /// Records the source and appends its callbacks in the given order.
    pub(crate) fn insert(
        &mut self,
        source_id: SourceId,
        callbacks: impl IntoIterator<Item = BoundCallback<P>>,
    ) {
        self.sources.insert(source_id);
        for callback in callbacks {
            match callback {
                BoundCallback::Setup(point, record) => self.setup.push(point, record),
                BoundCallback::Execute(point, record) => self.execute.push(point, record),
                BoundCallback::Cleanup(point, record) => self.cleanup.push(point, record),
            }
        }
    }

    /// Forgets the source and drops all of its records.
    ///
    /// Returns `None` if the source was not registered, otherwise the number
    /// of records removed.
    pub(crate) fn remove(&mut self, source_id: &SourceId) -> Option<usize> {
        if !self.sources.remove(source_id) {
            return None;
        }
        Some(
            self.setup.remove_source(source_id)
                + self.execute.remove_source(source_id)
                + self.cleanup.remove_source(source_id),
        )
    }

    pub(crate) fn count(&self, stage: StageKind, point: &P::InjectionPoint) -> usize {
        match stage {
            StageKind::Setup => self.setup.count(point),
            StageKind::Execute => self.execute.count(point),
            StageKind::Cleanup => self.cleanup.count(point),
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.setup.total() + self.execute.total() + self.cleanup.total()
    }

    pub(crate) fn has_callbacks(&self, source_id: &SourceId) -> bool {
        self.setup.contains_source(source_id)
            || self.execute.contains_source(source_id)
            || self.cleanup.contains_source(source_id)
    }

    pub(crate) fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub(crate) fn clear(&mut self) {
        self.sources.clear();
        self.setup.clear();
        self.execute.clear();
        self.cleanup.clear();
    }
}
