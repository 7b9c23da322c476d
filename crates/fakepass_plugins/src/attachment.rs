//! Lifecycle glue that keeps a source registered while its owner is active.
//!
//! A [`PassAttachment`] pairs a source with [`InjectionSettings`] and an
//! optional injector handle. The owner calls [`update`](PassAttachment::update)
//! once per frame with its activity flag; the attachment registers the source
//! while active (if `auto_inject` is set), unregisters it while inactive, and
//! unregisters it when dropped.
//!
//! # Example
//!
//! ```ignore
//! let settings = InjectionSettings::default()
//!     .with_auto_inject(true)
//!     .with_auto_find_injector(true);
//! let mut attachment = PassAttachment::<Outline, Hdrp>::new(outline, settings);
//!
//! // Every frame
//! attachment.update(&server, outline_enabled);
//! ```

use fakepass_core::{FakePass, Injector, Pipeline, Registration, Source};
use fakepass_system::server::Server;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// InjectionSettings
// ─────────────────────────────────────────────────────────────────────────────

/// How a [`PassAttachment`] manages its registration.
///
/// Both flags default to `false`. Missing fields deserialize to their
/// defaults, so a partial config section is valid:
///
/// ```
/// use fakepass_plugins::InjectionSettings;
///
/// let settings: InjectionSettings = serde_json::from_str(r#"{ "auto_inject": true }"#)
///     .expect("valid settings");
/// assert!(settings.auto_inject);
/// assert!(!settings.auto_find_injector);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionSettings {
    /// Register the source on every active update.
    pub auto_inject: bool,
    /// Look the injector up on the server when none is set.
    pub auto_find_injector: bool,
}

impl InjectionSettings {
    /// Sets `auto_inject`.
    #[must_use]
    pub fn with_auto_inject(mut self, enabled: bool) -> Self {
        self.auto_inject = enabled;
        self
    }

    /// Sets `auto_find_injector`.
    #[must_use]
    pub fn with_auto_find_injector(mut self, enabled: bool) -> Self {
        self.auto_find_injector = enabled;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PassAttachment
// ─────────────────────────────────────────────────────────────────────────────

/// Keeps a source's registration in step with its owner's lifecycle.
///
/// The registered source does not have to be the owner itself: any `Arc<T>`
/// can be attached.
pub struct PassAttachment<T: Source, P: Pipeline> {
    source: Arc<T>,
    settings: InjectionSettings,
    injector: Option<Injector<P>>,
}

impl<T: Source, P: Pipeline> PassAttachment<T, P> {
    /// Creates an attachment with no injector.
    #[must_use]
    pub fn new(source: Arc<T>, settings: InjectionSettings) -> Self {
        Self {
            source,
            settings,
            injector: None,
        }
    }

    /// Sets the injector explicitly.
    #[must_use]
    pub fn with_injector(mut self, injector: Injector<P>) -> Self {
        self.injector = Some(injector);
        self
    }

    /// The attached source.
    #[must_use]
    pub fn source(&self) -> &Arc<T> {
        &self.source
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> InjectionSettings {
        self.settings
    }

    /// Mutable access to the settings.
    pub fn settings_mut(&mut self) -> &mut InjectionSettings {
        &mut self.settings
    }

    /// The injector, if one is known.
    #[must_use]
    pub fn injector(&self) -> Option<&Injector<P>> {
        self.injector.as_ref()
    }

    /// Returns true if an injector is known and holds the source.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.injector
            .as_ref()
            .is_some_and(|injector| injector.contains(&self.source.source_id()))
    }

    /// Resolves the injector from the server if none is set.
    pub fn find_injector(&mut self, server: &Server) -> Option<&Injector<P>> {
        if self.injector.is_none() {
            self.injector = server.api::<Injector<P>>().cloned();
        }
        self.injector.as_ref()
    }

    /// Unregisters the source if an injector is known and holds it.
    ///
    /// Returns true if the source was removed.
    pub fn detach(&mut self) -> bool {
        let Some(injector) = &self.injector else {
            return false;
        };
        let source_id = self.source.source_id();
        if !injector.contains(&source_id) {
            return false;
        }
        injector.remove(&source_id);
        true
    }
}

impl<T: FakePass<P>, P: Pipeline> PassAttachment<T, P> {
    /// Registers the source if an injector is known and does not hold it yet.
    ///
    /// Returns the registration, or `None` if nothing was attempted.
    pub fn attach(&mut self) -> Option<Registration> {
        let injector = self.injector.as_ref()?;
        if injector.contains(&self.source.source_id()) {
            return None;
        }
        Some(injector.add(&self.source))
    }

    /// Per-frame glue.
    ///
    /// Resolves the injector first when `auto_find_injector` is set. An
    /// inactive owner is detached; an active one is attached when
    /// `auto_inject` is set.
    pub fn update(&mut self, server: &Server, active: bool) -> Option<Registration> {
        if self.settings.auto_find_injector {
            self.find_injector(server);
        }

        if !active {
            self.detach();
            return None;
        }

        if self.settings.auto_inject {
            self.attach()
        } else {
            None
        }
    }
}

impl<T: Source, P: Pipeline> Drop for PassAttachment<T, P> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_manual() {
        let settings = InjectionSettings::default();
        assert!(!settings.auto_inject);
        assert!(!settings.auto_find_injector);
    }

    #[test]
    fn settings_builder() {
        let settings = InjectionSettings::default()
            .with_auto_inject(true)
            .with_auto_find_injector(true);
        assert!(settings.auto_inject);
        assert!(settings.auto_find_injector);
    }
}
