#![forbid(unsafe_code)]

//! Panic containment for host callbacks.
//!
//! Host code runs inside the engine's event handling. A panicking callback
//! must not leave a gesture half-applied (captured pointer, floating item,
//! orphaned clone), so every invocation goes through [`emit`]. The caller
//! aborts the gesture when it gets a [`CallbackFault`] back.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// A boxed host callback receiving a borrowed event.
pub type Callback<E> = Box<dyn FnMut(&E)>;

/// A host callback that panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFault {
    /// Name of the callback slot, e.g. `"on_drop"`.
    pub callback: &'static str,
    /// Panic message, when the payload was a string.
    pub message: String,
}

impl CallbackFault {
    fn from_panic(payload: Box<dyn Any + Send>, callback: &'static str) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self { callback, message }
    }
}

impl fmt::Display for CallbackFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} callback panicked: {}", self.callback, self.message)
    }
}

impl std::error::Error for CallbackFault {}

/// Invoke the callback in `slot`, if any, catching panics.
pub(crate) fn emit<E>(
    slot: &mut Option<Callback<E>>,
    callback: &'static str,
    event: &E,
) -> Result<(), CallbackFault> {
    let Some(f) = slot.as_mut() else {
        return Ok(());
    };
    catch_unwind(AssertUnwindSafe(|| f(event)))
        .map_err(|payload| CallbackFault::from_panic(payload, callback))
}

/// Keep the first fault; later callbacks in the same transition are skipped.
pub(crate) fn emit_unless_faulted<E>(
    fault: &mut Option<CallbackFault>,
    slot: &mut Option<Callback<E>>,
    callback: &'static str,
    event: &E,
) {
    if fault.is_none()
        && let Err(err) = emit(slot, callback, event)
    {
        *fault = Some(err);
    }
}
