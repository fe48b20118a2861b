#![forbid(unsafe_code)]

//! Logging shim.
//!
//! With the `tracing` feature the level macros are the `tracing` ones. Without
//! it, `#[macro_export]` stand-ins with the same names expand to nothing, so
//! call sites in downstream crates never need their own `cfg` guards:
//!
//! ```
//! pinboard_core::debug!(target: pinboard_core::logging::DRAG_TARGET, "drag started");
//! ```

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Target used by the free-drag controller.
pub const DRAG_TARGET: &str = "pinboard::drag";

/// Target used by the sortable list controller.
pub const SORT_TARGET: &str = "pinboard::sortable";

/// Target used by registration and event routing.
pub const HUB_TARGET: &str = "pinboard::hub";

/// Target used by the in-memory scene.
pub const SCENE_TARGET: &str = "pinboard::scene";

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// Discards a trace event.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Discards a debug event.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Discards an info event.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// Discards a warn event.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// Discards an error event.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    /// Builds an inert trace span.
    #[macro_export]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// Builds an inert debug span.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// Builds an inert info span.
    #[macro_export]
    macro_rules! info_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// Builds an inert warn span.
    #[macro_export]
    macro_rules! warn_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// Builds an inert error span.
    #[macro_export]
    macro_rules! error_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Span stand-in used when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Mirrors `tracing::Span::entered`.
    #[must_use]
    pub fn entered(self) -> NoopGuard {
        NoopGuard
    }

    /// Mirrors `tracing::Span::enter`.
    #[must_use]
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned by [`NoopSpan`].
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    #[test]
    fn noop_macros_accept_tracing_syntax() {
        let node = 7_u32;
        crate::debug!(target: super::DRAG_TARGET, node, ?node, "started {}", node);
        crate::warn!("plain message");
        let _guard = crate::debug_span!("gesture", node).entered();
    }
}
