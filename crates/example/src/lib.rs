//! Example fake pass driven by a mock HD render pipeline.
//!
//! [`ExampleFakePass`] contributes a Setup and an Execute pass after the
//! depth and normal prepass, plus a Cleanup pass with the wrong shape that
//! the injector reports and skips.
//!
//! ```text
//! ┌──────────────┐  update()   ┌────────────────┐
//! │PassAttachment│────────────▶│ Injector<Hdrp> │◀── InjectorPlugin
//! └──────────────┘  add/remove └───────┬────────┘
//!                                      │ on_setup / on_execute / on_cleanup
//!                              ┌───────┴────────┐
//!                              │  InjectorPass  │ x 6 injection points
//!                              └───────┬────────┘
//!                                      │
//!                              ┌───────┴────────┐
//!                              │   HdPipeline   │
//!                              └────────────────┘
//! ```

pub mod hdrp;

use fakepass_core::{FakePass, PassTable, Source, SourceId};
use fakepass_plugins::{InjectionSettings, TracingFormat};
use hdrp::{CommandBuffer, CustomPassInjectionPoint, Hdrp, PassContext, RenderContext};
use serde::{Deserialize, Serialize};

/// Outline pass injected after the depth and normal prepass.
#[derive(Debug)]
pub struct ExampleFakePass {
    id: SourceId,
    /// Outline thickness in pixels.
    pub thickness: f32,
}

impl ExampleFakePass {
    /// Creates the pass with a fresh identity.
    #[must_use]
    pub fn new(thickness: f32) -> Self {
        Self {
            id: SourceId::new(),
            thickness,
        }
    }

    fn setup_after_depth(&self, render_context: &RenderContext, cmd: &mut CommandBuffer) {
        cmd.record(format!(
            "allocate outline target {}x{}",
            render_context.width, render_context.height
        ));
    }

    fn execute_after_depth(&self, ctx: &mut PassContext) {
        ctx.cmd.record(format!(
            "draw outline {}px for {} (frame {})",
            self.thickness, ctx.camera, ctx.frame
        ));
    }

    // Cleanup takes no parameters; this one is rejected at registration.
    fn cleanup_after_depth(&self, ctx: &mut PassContext) {
        ctx.cmd.record("release outline target");
    }
}

impl Source for ExampleFakePass {
    fn source_id(&self) -> SourceId {
        self.id.clone()
    }

    fn source_name(&self) -> &'static str {
        "ExampleFakePass"
    }
}

impl FakePass<Hdrp> for ExampleFakePass {
    fn passes(table: &mut PassTable<Self, Hdrp>) {
        let point = CustomPassInjectionPoint::AfterOpaqueDepthAndNormal;
        table
            .setup("setup_after_depth", point, Self::setup_after_depth)
            .execute("execute_after_depth", point, Self::execute_after_depth)
            .cleanup("cleanup_after_depth", point, Self::cleanup_after_depth);
    }
}

/// Demo configuration, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of frames to render.
    pub frames: u64,
    /// Frame at which the pass owner is deactivated, if any.
    pub deactivate_at: Option<u64>,
    /// Log output format.
    pub log_format: TracingFormat,
    /// Attachment settings of the example pass.
    pub injection: InjectionSettings,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 4,
            deactivate_at: Some(2),
            log_format: TracingFormat::Compact,
            injection: InjectionSettings::default()
                .with_auto_inject(true)
                .with_auto_find_injector(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fakepass_core::{Injector, InjectionError, StageKind};
    use fakepass_plugins::{InjectorPlugin, PassAttachment};
    use fakepass_system::server::Server;
    use hdrp::HdPipeline;
    use std::sync::Arc;

    fn server() -> Server {
        let mut server = Server::new();
        server.add_plugins(InjectorPlugin::<Hdrp>::new());
        server.finish();
        server
    }

    #[test]
    fn misshaped_cleanup_is_rejected() {
        let injector = Injector::<Hdrp>::new();
        let pass = Arc::new(ExampleFakePass::new(2.0));

        let registration = injector.add(&pass);

        assert_eq!(registration.registered(), 2);
        assert!(matches!(
            registration.errors(),
            [InjectionError::SignatureMismatch {
                method: "cleanup_after_depth",
                stage: StageKind::Cleanup,
                ..
            }]
        ));
    }

    #[test]
    fn pipeline_records_setup_once_and_execute_every_frame() {
        let server = server();
        let pass = Arc::new(ExampleFakePass::new(1.5));
        let mut attachment =
            PassAttachment::<ExampleFakePass, Hdrp>::new(pass, DemoConfig::default().injection);
        attachment.update(&server, true);

        let mut pipeline = HdPipeline::new(
            RenderContext {
                width: 64,
                height: 32,
            },
            "main",
        );

        let first = pipeline.render(&server, 0);
        let second = pipeline.render(&server, 1);

        assert_eq!(
            first,
            vec![
                "allocate outline target 64x32".to_owned(),
                "draw outline 1.5px for main (frame 0)".to_owned(),
            ]
        );
        assert_eq!(second, vec!["draw outline 1.5px for main (frame 1)".to_owned()]);
    }

    #[test]
    fn inactive_owner_stops_drawing() {
        let server = server();
        let pass = Arc::new(ExampleFakePass::new(1.0));
        let mut attachment =
            PassAttachment::<ExampleFakePass, Hdrp>::new(pass, DemoConfig::default().injection);
        let mut pipeline = HdPipeline::new(
            RenderContext {
                width: 8,
                height: 8,
            },
            "main",
        );

        attachment.update(&server, true);
        assert_eq!(pipeline.render(&server, 0).len(), 2);

        attachment.update(&server, false);
        assert!(pipeline.render(&server, 1).is_empty());
    }

    #[test]
    fn demo_config_partial_json() {
        let config: DemoConfig =
            serde_json::from_str(r#"{ "frames": 10, "log_format": "json" }"#)
                .expect("config should deserialize");
        assert_eq!(config.frames, 10);
        assert_eq!(config.log_format, TracingFormat::Json);
        assert_eq!(config.deactivate_at, Some(2));
        assert!(config.injection.auto_inject);
    }
}
