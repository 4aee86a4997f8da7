#![forbid(unsafe_code)]

//! Failure containment for callbacks owned by someone else.
//!
//! Subscriber callbacks, event listeners, teardown closures, and model
//! factories are user code. A panic in one of them must not abort the rest of
//! the notification or teardown pass, so every such call goes through
//! [`contain`]: the panic is caught, logged at `warn`, and the caller carries
//! on with the next consumer.
//!
//! # Failure Modes
//!
//! - Requires unwinding; with `panic = "abort"` a callback panic still aborts.
//! - The default panic hook still prints the panic message to stderr.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Run `f`, converting a panic into `None`.
///
/// `site` names the call site in the log record (for example
/// `"observer.handler"`).
pub fn contain<R>(site: &str, f: impl FnOnce() -> R) -> Option<R> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::warn!(
                target: "kview::contain",
                site,
                reason = %panic_message(payload.as_ref()),
                "callback failed; continuing"
            );
            None
        }
    }
}

/// Best-effort extraction of a panic payload's message.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
