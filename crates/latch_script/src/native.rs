//! Process-wide snapshot of the host's capability table
//!
//! Captured by value at startup and replaced wholesale by a later startup.
//! Until the first capture every slot is null, so every service reports its
//! neutral default and logging goes nowhere.
//!
//! Log lines written while the bridge holds one of its own locks are held back
//! with [`deferred`] and delivered once the lock is released, so a host log
//! sink may call back into the bridge.

use once_cell::sync::Lazy;
use std::cell::RefCell;
use std::sync::{PoisonError, RwLock};

use crate::abi::NativeApi;

static NATIVE_API: Lazy<RwLock<NativeApi>> = Lazy::new(|| RwLock::new(NativeApi::default()));

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingLine {
    Info(String),
    Error(String),
}

thread_local! {
    static PENDING: RefCell<Option<Vec<PendingLine>>> = const { RefCell::new(None) };
}

/// Replace the captured table (last write wins).
pub fn install(api: NativeApi) {
    *NATIVE_API.write().unwrap_or_else(PoisonError::into_inner) = api;
}

/// Copy of the currently captured table.
pub fn current() -> NativeApi {
    *NATIVE_API.read().unwrap_or_else(PoisonError::into_inner)
}

/// Forward an informational line to the host log sink.
pub fn log_info(message: &str) {
    tracing::debug!(target: "latch_script", "{message}");
    if !hold_back(|| PendingLine::Info(message.to_string())) {
        current().log_info(message);
    }
}

/// Forward an error line to the host log sink.
pub fn log_error(message: &str) {
    tracing::debug!(target: "latch_script", error = true, "{message}");
    if !hold_back(|| PendingLine::Error(message.to_string())) {
        current().log_error(message);
    }
}

fn hold_back(line: impl FnOnce() -> PendingLine) -> bool {
    PENDING.with(|pending| match pending.borrow_mut().as_mut() {
        Some(lines) => {
            lines.push(line());
            true
        }
        None => false,
    })
}

/// Clears the pending buffer even if the deferred call unwinds.
struct PendingScope;

impl Drop for PendingScope {
    fn drop(&mut self) {
        PENDING.with(|pending| pending.borrow_mut().take());
    }
}

/// Run `f`, delivering the log lines it writes only after it returns.
///
/// Nested calls join the outermost one. Lines from a call that panics are
/// dropped; the panic itself is reported by the caller's boundary.
pub fn deferred<R>(f: impl FnOnce() -> R) -> R {
    let outermost = PENDING.with(|pending| {
        let mut pending = pending.borrow_mut();
        if pending.is_some() {
            false
        } else {
            *pending = Some(Vec::new());
            true
        }
    });
    if !outermost {
        return f();
    }

    let scope = PendingScope;
    let result = f();
    let lines = PENDING
        .with(|pending| pending.borrow_mut().take())
        .unwrap_or_default();
    drop(scope);

    let api = current();
    for line in lines {
        match line {
            PendingLine::Info(message) => api.log_info(&message),
            PendingLine::Error(message) => api.log_error(&message),
        }
    }
    result
}
