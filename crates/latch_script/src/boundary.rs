//! Failure containment
//!
//! Nothing raised inside the bridge or a script may unwind into the host. Every
//! call that can fail runs through [`contain`], which turns a panic into a
//! [`Failure`] value the caller logs and then drops.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{BridgeError, ScriptError};

/// A contained failure: category plus human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: String,
    pub message: String,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::new("panic", message)
    }
}

impl From<ScriptError> for Failure {
    fn from(err: ScriptError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<BridgeError> for Failure {
    fn from(err: BridgeError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Run `f`, converting a panic into a [`Failure`].
///
/// The default panic hook still runs and prints to stderr; the caller is
/// responsible for reporting the failure through the host log.
pub fn contain<R>(f: impl FnOnce() -> R) -> Result<R, Failure> {
    catch_unwind(AssertUnwindSafe(f)).map_err(Failure::from_panic)
}

/// Run a fallible call, flattening both error paths into a [`Failure`].
pub fn contain_result<R, E>(f: impl FnOnce() -> Result<R, E>) -> Result<R, Failure>
where
    E: Into<Failure>,
{
    contain(f)?.map_err(Into::into)
}
