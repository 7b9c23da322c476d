//! Tracing and observability plugin.
//!
//! Provides [`TracingPlugin`] which configures the `tracing` subscriber and
//! exposes configuration as a resource. Registration and dispatch errors from
//! the injector are emitted at `error` level, so the default `INFO` level is
//! enough to see them.
//!
//! Unless a custom filter is set, only the fakepass crates (and any extra
//! targets named with [`TracingPlugin::with_target`]) log at the configured
//! level. Everything else is held at `WARN`, so a verbose level does not
//! flood the output with the host's own dependencies.
//!
//! # Lifecycle
//!
//! - **`build()`** registers the [`TracingConfig`] resource so other plugins
//!   can read the intended configuration during build.
//! - **`ready()`** initializes the tracing subscriber. This deferred
//!   initialization allows other plugins to influence tracing settings before
//!   the subscriber is installed.
//!
//! # Example
//!
//! ```
//! use fakepass_system::server::Server;
//! use fakepass_plugins::{TracingPlugin, TracingFormat};
//! use tracing::Level;
//!
//! let mut server = Server::new();
//! server.add_plugins(
//!     TracingPlugin::default()
//!         .with_level(Level::DEBUG)
//!         .with_format(TracingFormat::Compact)
//! );
//! server.finish();
//! ```

use fakepass_system::plugin::Plugin;
use fakepass_system::resource::GlobalResource;
use fakepass_system::server::Server;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Targets logged at the configured level by the default filter.
pub const FAKEPASS_TARGETS: &[&str] = &["fakepass_core", "fakepass_plugins"];

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
///
/// Deserializes from lowercase names (`"pretty"`, `"compact"`, `"json"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig Resource
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing configuration resource.
///
/// Global resource exposing the tracing configuration, so pipeline glue can
/// skip building expensive diagnostics when they would be filtered out.
///
/// # Example
///
/// ```
/// use fakepass_system::server::Server;
/// use fakepass_plugins::{TracingConfig, TracingPlugin};
/// use tracing::Level;
///
/// let mut server = Server::new();
/// server.add_plugins(TracingPlugin::default());
/// server.finish();
///
/// let config = server.get_global::<TracingConfig>().expect("tracing configured");
/// if config.level <= Level::DEBUG {
///     tracing::debug!(format = ?config.format, "verbose pass diagnostics enabled");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// The configured log level.
    pub level: Level,
    /// The configured output format.
    pub format: TracingFormat,
    /// The filter directive the subscriber is installed with.
    pub filter: String,
}

impl GlobalResource for TracingConfig {}

// ─────────────────────────────────────────────────────────────────────────────
// TracingPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing and logging plugin.
///
/// Configures the `tracing` subscriber and provides observability resources.
/// Uses the [`tracing`] and [`tracing_subscriber`] crates under the hood.
///
/// # Resources Provided
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`TracingConfig`] | Global | Tracing configuration (read-only) |
///
/// # Configuration Options
///
/// ```
/// use fakepass_plugins::{TracingPlugin, TracingFormat};
/// use tracing::Level;
///
/// // Development: Pretty colored output with debug level
/// let dev_plugin = TracingPlugin::default()
///     .with_level(Level::DEBUG)
///     .with_format(TracingFormat::Pretty)
///     .with_span_events(true);
///
/// // Production: JSON output for log aggregation
/// let prod_plugin = TracingPlugin::default()
///     .with_level(Level::INFO)
///     .with_format(TracingFormat::Json)
///     .with_env_filter("fakepass_core=info,fakepass_plugins=warn");
/// ```
#[derive(Clone)]
pub struct TracingPlugin {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Environment filter (e.g., "fakepass_core=debug").
    env_filter: Option<String>,
    /// Extra targets logged at `level` by the default filter.
    targets: Vec<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingPlugin {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            targets: Vec::new(),
            span_events: false,
        }
    }
}

impl TracingPlugin {
    /// Creates a new `TracingPlugin` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string, replacing the default one.
    ///
    /// Format: `target=level,target=level,...`. An unparsable filter falls
    /// back to the configured level for every target.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Logs `target` at the configured level alongside [`FAKEPASS_TARGETS`].
    ///
    /// Hosts name their own crates here so their pass sources and pipeline
    /// glue share the injector's verbosity. Ignored when a custom filter is
    /// set.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    /// Enables span enter/exit events in output.
    ///
    /// Each dispatch runs inside a `fakepass_dispatch` span at `TRACE` level.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// The filter directive the subscriber is installed with.
    ///
    /// Without a custom filter this is the quieter of `WARN` and the
    /// configured level for every target, then the configured level for the
    /// fakepass crates and the extra targets.
    fn directive(&self) -> String {
        if let Some(filter) = &self.env_filter {
            return filter.clone();
        }

        let level = self.level.as_str().to_ascii_lowercase();
        let base = self.level.min(Level::WARN).as_str().to_ascii_lowercase();
        let targets = FAKEPASS_TARGETS
            .iter()
            .copied()
            .chain(self.targets.iter().map(String::as_str))
            .map(|target| format!("{target}={level}"));

        core::iter::once(base)
            .chain(targets)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.directive()).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
    }
}

impl Plugin for TracingPlugin {
    fn build(&self, server: &mut Server) {
        // Subscriber initialization happens at ready().
        server.insert_global(TracingConfig {
            level: self.level,
            format: self.format,
            filter: self.directive(),
        });
    }

    fn ready(&self, _server: &mut Server) {
        let env_filter = self.env_filter();

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        // try_init().ok() ignores errors if a subscriber is already installed
        match self.format {
            TracingFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
            TracingFormat::Compact => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
            TracingFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
        }

        tracing::info!(
            level = %self.level,
            format = ?self.format,
            filter = %self.directive(),
            "TracingPlugin initialized"
        );
    }

    fn cleanup(&self, _server: &mut Server) {
        tracing::info!("TracingPlugin shutting down");
    }
}
