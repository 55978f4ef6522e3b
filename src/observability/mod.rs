//! Call diagnostics for verbose binders.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the application.
//!
//! # Example
//!
//! ```no_run
//! use clify::binding::CallArgs;
//! use clify::observability::log_call;
//!
//! let call = CallArgs::default().arg("a").kwarg("y", 1);
//! log_call("f", &call);
//! ```

use crate::binding::CallArgs;
use tracing::info;

/// Event target used for verbose call diagnostics
pub const CALL_TARGET: &str = "clify::call";

/// Log the fully merged arguments a target is about to be dispatched with
pub fn log_call(target: &str, call: &CallArgs) {
    info!(
        target: CALL_TARGET,
        target_name = target,
        "Calling {} with\nargs:\n{}\nkwargs:\n{}",
        target,
        pretty(&call.args),
        pretty(&call.kwargs)
    );
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
