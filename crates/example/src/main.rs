//! Fake pass demo CLI.
//!
//! Renders a few frames of the mock HD pipeline with [`ExampleFakePass`]
//! attached, deactivates its owner part way through, and shuts down.
//!
//! # Usage
//!
//! ```bash
//! fakepass-demo [config.json]
//! ```
//!
//! # Example
//!
//! ```bash
//! echo '{ "frames": 6, "deactivate_at": 4, "log_format": "pretty" }' > demo.json
//! fakepass-demo demo.json
//! ```

#![expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "the demo prints rendered commands and config errors"
)]

use example::hdrp::{HdPipeline, Hdrp, RenderContext};
use example::{DemoConfig, ExampleFakePass};
use fakepass_plugins::{InjectorPlugin, PassAttachment, TracingPlugin};
use fakepass_system::server::Server;
use std::sync::Arc;
use tracing::Level;

fn load_config() -> DemoConfig {
    let Some(path) = std::env::args().nth(1) else {
        return DemoConfig::default();
    };

    let contents = std::fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("Error: cannot read {path}: {e}");
        std::process::exit(1);
    });
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        eprintln!("Error: invalid config {path}: {e}");
        std::process::exit(1);
    })
}

fn main() {
    let config = load_config();

    // Initialize server with plugins
    let mut server = Server::new();
    server.add_plugins(
        TracingPlugin::default()
            .with_level(Level::DEBUG)
            .with_format(config.log_format)
            .with_target("example")
            .with_target("fakepass_demo"),
    );
    server.add_plugins(InjectorPlugin::<Hdrp>::new());
    server.finish();

    let pass = Arc::new(ExampleFakePass::new(2.5));
    let mut attachment = PassAttachment::<ExampleFakePass, Hdrp>::new(pass, config.injection);
    let mut pipeline = HdPipeline::new(
        RenderContext {
            width: 1920,
            height: 1080,
        },
        "main camera",
    );

    for frame in 0..config.frames {
        let active = config.deactivate_at.is_none_or(|at| frame < at);
        if let Some(registration) = attachment.update(&server, active) {
            tracing::info!(
                registered = registration.registered(),
                rejected = registration.errors().len(),
                "example pass attached"
            );
        }

        for command in pipeline.render(&server, frame) {
            println!("[frame {frame}] {command}");
        }
    }

    pipeline.shutdown(&server);
    drop(attachment);
    server.cleanup();
}
