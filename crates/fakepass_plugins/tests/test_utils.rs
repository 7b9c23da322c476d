//! Shared test utilities for `fakepass_plugins` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use fakepass_core::prelude::*;
use fakepass_plugins::InjectorPlugin;
use fakepass_system::server::Server;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// MOCK PIPELINE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Point {
    #[default]
    AfterOpaque,
    BeforePost,
}

pub struct Mock;

impl Pipeline for Mock {
    type InjectionPoint = Point;
    type RenderContext = ();
    type CommandBuffer = Vec<&'static str>;
    type PassContext = Vec<&'static str>;
}

/// Creates a finished server with an `InjectorPlugin<Mock>`.
pub fn create_test_server() -> Server {
    let mut server = Server::new();
    server.add_plugins(InjectorPlugin::<Mock>::new());
    server.finish();
    server
}

/// Returns the injector published by the server.
pub fn injector(server: &Server) -> Injector<Mock> {
    server
        .api::<Injector<Mock>>()
        .cloned()
        .expect("InjectorPlugin should publish an injector")
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCES
// ═══════════════════════════════════════════════════════════════════════════════

/// Counts Execute calls at `BeforePost` and pushes into the pass context.
#[derive(Default)]
pub struct Counter {
    pub id: SourceId,
    pub executed: AtomicUsize,
}

impl Counter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    fn setup(&self, _render: &(), cmd: &mut Vec<&'static str>) {
        cmd.push("counter:setup");
    }

    fn execute(&self, ctx: &mut Vec<&'static str>) {
        self.executed.fetch_add(1, Ordering::SeqCst);
        ctx.push("counter:execute");
    }
}

impl Source for Counter {
    fn source_id(&self) -> SourceId {
        self.id.clone()
    }
}

impl FakePass<Mock> for Counter {
    fn passes(table: &mut PassTable<Self, Mock>) {
        table
            .setup("setup", Point::BeforePost, Self::setup)
            .execute("execute", Point::BeforePost, Self::execute);
    }
}
