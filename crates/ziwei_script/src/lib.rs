//! Ziwei Script Host
//!
//! Hosts the chart engine bundle inside an embedded JavaScript runtime
//! (QuickJS) and exposes the two primitives the bridge is built on:
//!
//! - `evaluate(code)` with exactly one completion per call
//! - a single inbound message handler the runtime may invoke at any time
//!
//! Scripts reach the host through `<handler>.postMessage(text)`, also
//! reachable as `window.webkit.messageHandlers.<handler>.postMessage(text)`
//! so bundles written for a web view run unmodified.

pub mod runtime;

pub use rquickjs;
pub use runtime::ScriptRuntime;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the script runtime
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Runtime initialization failed: {0}")]
    InitError(String),

    #[error("Failed to load script '{name}': {message}")]
    LoadError { name: String, message: String },

    #[error("JavaScript error: {0}")]
    JsError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one `evaluate` call: the return value when it was a string.
pub type EvalResult = Result<Option<String>, ScriptError>;

/// Invoked exactly once with the outcome of an `evaluate` call.
pub type EvalCompletion = Box<dyn FnOnce(EvalResult)>;

/// Receives every message the runtime pushes through the handler object.
pub type MessageHandler = Box<dyn Fn(String)>;

/// The two primitives an embedded script environment offers the bridge.
pub trait ScriptHost {
    /// Evaluate `code` and report its outcome through `completion`.
    ///
    /// The completion may run before this returns or later on the same
    /// thread; messages pushed while evaluating reach the handler first.
    fn evaluate(&self, code: &str, completion: EvalCompletion);

    /// Install the inbound handler, replacing any previous one.
    ///
    /// The handler may be invoked during `evaluate` or at any later point on
    /// the same thread. It only enqueues; callers waiting on a pushed result
    /// must keep draining what it enqueued (the bridge's `resolve` does).
    fn set_message_handler(&self, handler: MessageHandler);
}

/// Configuration for the embedded runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Global name of the message handler object.
    pub handler_name: String,
    /// Maximum memory usage in bytes
    pub memory_limit: usize,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            handler_name: "iztroHandler".to_string(),
            memory_limit: 64 * 1024 * 1024, // 64 MB
        }
    }
}
