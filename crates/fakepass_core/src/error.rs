//! Error types for registration and dispatch.
//!
//! None of these errors abort the operation that produced them. Registration
//! skips the offending method and keeps going; dispatch skips the offending
//! callback and keeps going. Each error is logged when it occurs and handed
//! back in a [`Registration`](crate::Registration) or
//! [`DispatchReport`](crate::DispatchReport).

use crate::source::SourceId;
use crate::stage::{ReturnKind, Signature, StageKind};
use thiserror::Error;

/// Errors that can occur while registering or dispatching fake passes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    /// The source is already registered with this injector.
    #[error("attempted to inject {source_name} twice ({source_id})")]
    DuplicateRegistration {
        /// Id of the rejected source.
        source_id: SourceId,
        /// Diagnostic name of the source.
        source_name: &'static str,
    },

    /// A tagged method returns something other than `()`.
    #[error("cannot inject {source_name}::{method}: pass methods must return (), found {found}")]
    InvalidReturnType {
        /// Diagnostic name of the source.
        source_name: &'static str,
        /// Offending method.
        method: &'static str,
        /// The method's return type.
        found: ReturnKind,
    },

    /// A tagged method's parameters do not match its stage.
    #[error(
        "cannot inject {source_name}::{method}: wrong signature for {stage}, expected {expected}, found {found}"
    )]
    SignatureMismatch {
        /// Diagnostic name of the source.
        source_name: &'static str,
        /// Offending method.
        method: &'static str,
        /// Stage the method is tagged with.
        stage: StageKind,
        /// Signature the stage requires.
        expected: Signature,
        /// Signature the method has.
        found: Signature,
    },

    /// A callback panicked during dispatch.
    #[error("{source_name}::{method} panicked during {stage}: {message}")]
    CallbackPanicked {
        /// Id of the callback's source.
        source_id: SourceId,
        /// Diagnostic name of the source.
        source_name: &'static str,
        /// Method that panicked.
        method: &'static str,
        /// Stage being dispatched.
        stage: StageKind,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// A callback's source was dropped without being removed.
    #[error("{source_name}::{method} skipped during {stage}: source was dropped")]
    SourceDropped {
        /// Id of the dropped source.
        source_id: SourceId,
        /// Diagnostic name of the source.
        source_name: &'static str,
        /// Method that was skipped.
        method: &'static str,
        /// Stage being dispatched.
        stage: StageKind,
    },
}

impl InjectionError {
    /// Returns true for errors raised by registration.
    #[must_use]
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRegistration { .. }
                | Self::InvalidReturnType { .. }
                | Self::SignatureMismatch { .. }
        )
    }

    /// Returns true for errors raised by dispatch.
    #[must_use]
    pub fn is_dispatch_error(&self) -> bool {
        !self.is_registration_error()
    }

    /// The method the error is about, if it concerns a single method.
    #[must_use]
    pub fn method(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateRegistration { .. } => None,
            Self::InvalidReturnType { method, .. }
            | Self::SignatureMismatch { method, .. }
            | Self::CallbackPanicked { method, .. }
            | Self::SourceDropped { method, .. } => Some(*method),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::ParamKind;

    #[test]
    fn signature_mismatch_message_names_both_shapes() {
        let error = InjectionError::SignatureMismatch {
            source_name: "Outline",
            method: "cleanup",
            stage: StageKind::Cleanup,
            expected: StageKind::Cleanup.required_signature(),
            found: Signature::new(&[ParamKind::PassContext], ReturnKind::Unit),
        };

        assert_eq!(
            error.to_string(),
            "cannot inject Outline::cleanup: wrong signature for Cleanup, expected () -> (), found (PassContext) -> ()"
        );
        assert!(error.is_registration_error());
        assert_eq!(error.method(), Some("cleanup"));
    }

    #[test]
    fn duplicate_has_no_method() {
        let error = InjectionError::DuplicateRegistration {
            source_id: SourceId::from_string("a"),
            source_name: "Outline",
        };
        assert_eq!(error.method(), None);
        assert_eq!(
            error.to_string(),
            "attempted to inject Outline twice (source_a)"
        );
    }

    #[test]
    fn panics_are_dispatch_errors() {
        let error = InjectionError::CallbackPanicked {
            source_id: SourceId::from_string("a"),
            source_name: "Outline",
            method: "execute",
            stage: StageKind::Execute,
            message: "boom".into(),
        };
        assert!(error.is_dispatch_error());
        assert_eq!(
            error.to_string(),
            "Outline::execute panicked during Execute: boom"
        );
    }
}
