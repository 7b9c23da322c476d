//! A mock HD render pipeline.
//!
//! Just enough of a pipeline to drive an injector: injection points, a
//! recording command buffer and a per-pass context. [`HdPipeline`] owns one
//! [`InjectorPass`] per exposed injection point and runs them in frame order.

use fakepass_core::{DispatchReport, Pipeline};
use fakepass_plugins::InjectorPass;
use fakepass_system::server::Server;
use serde::{Deserialize, Serialize};

/// Where a custom pass can be injected into the frame, in frame order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomPassInjectionPoint {
    /// Before any geometry is rendered.
    BeforeRendering,
    /// After the depth and normal prepass.
    #[default]
    AfterOpaqueDepthAndNormal,
    /// Before sky and transparent geometry.
    BeforeTransparent,
    /// Before the refraction color pyramid is built.
    BeforePreRefraction,
    /// Before post processing.
    BeforePostProcess,
    /// After post processing.
    AfterPostProcess,
}

impl CustomPassInjectionPoint {
    /// All injection points, in frame order.
    pub const ALL: [CustomPassInjectionPoint; 6] = [
        CustomPassInjectionPoint::BeforeRendering,
        CustomPassInjectionPoint::AfterOpaqueDepthAndNormal,
        CustomPassInjectionPoint::BeforeTransparent,
        CustomPassInjectionPoint::BeforePreRefraction,
        CustomPassInjectionPoint::BeforePostProcess,
        CustomPassInjectionPoint::AfterPostProcess,
    ];
}

/// Render context handed to Setup callbacks.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// Records the commands passes issue.
#[derive(Debug, Default, Clone)]
pub struct CommandBuffer {
    commands: Vec<String>,
}

impl CommandBuffer {
    /// Appends a command.
    pub fn record(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }

    /// Commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<String> {
        core::mem::take(&mut self.commands)
    }
}

/// Per-pass context handed to Execute callbacks.
#[derive(Debug)]
pub struct PassContext {
    /// Frame being rendered.
    pub frame: u64,
    /// Camera the pass renders for.
    pub camera: String,
    /// Command buffer of the pass.
    pub cmd: CommandBuffer,
}

/// Marker type for the mock HD pipeline.
pub struct Hdrp;

impl Pipeline for Hdrp {
    type InjectionPoint = CustomPassInjectionPoint;
    type RenderContext = RenderContext;
    type CommandBuffer = CommandBuffer;
    type PassContext = PassContext;
}

/// Drives one [`InjectorPass`] per injection point.
pub struct HdPipeline {
    render_context: RenderContext,
    camera: String,
    passes: Vec<InjectorPass<Hdrp>>,
    initialized: bool,
}

impl HdPipeline {
    /// Creates a pipeline exposing every injection point, finding the
    /// injector on the server.
    #[must_use]
    pub fn new(render_context: RenderContext, camera: impl Into<String>) -> Self {
        let passes = CustomPassInjectionPoint::ALL
            .into_iter()
            .map(|point| InjectorPass::new(point).with_auto_find_injector(true))
            .collect();
        Self {
            render_context,
            camera: camera.into(),
            passes,
            initialized: false,
        }
    }

    /// Renders one frame and returns every command recorded, in order.
    ///
    /// Setup runs for every pass on the first frame only.
    pub fn render(&mut self, server: &Server, frame: u64) -> Vec<String> {
        let mut recorded = Vec::new();

        if !self.initialized {
            let mut cmd = CommandBuffer::default();
            for pass in &mut self.passes {
                if let Some(report) = pass.setup(server, &self.render_context, &mut cmd) {
                    log_failures(&report);
                }
            }
            recorded.extend(cmd.drain());
            self.initialized = true;
        }

        for pass in &mut self.passes {
            let mut ctx = PassContext {
                frame,
                camera: self.camera.clone(),
                cmd: CommandBuffer::default(),
            };
            if let Some(report) = pass.execute(server, &mut ctx) {
                log_failures(&report);
            }
            recorded.extend(ctx.cmd.drain());
        }

        recorded
    }

    /// Runs Cleanup for every pass.
    pub fn shutdown(&mut self, server: &Server) {
        for pass in &mut self.passes {
            if let Some(report) = pass.cleanup(server) {
                log_failures(&report);
            }
        }
        self.initialized = false;
    }
}

fn log_failures(report: &DispatchReport) {
    if !report.is_clean() {
        tracing::warn!(
            stage = %report.stage(),
            failed = report.failures().len(),
            "frame continued past failing fake passes"
        );
    }
}
