//! Platform abstraction (timers, clocks, native logger).
//!
//! The state core only talks to this module for time, so the same controllers
//! run under tokio natively and under the browser event loop on wasm32.
//! On wasm32 the DOM adapter installs `wasm-logger` and
//! `console_error_panic_hook` itself.

#[cfg(target_arch = "wasm32")]
mod runtime_wasm;
#[cfg(target_arch = "wasm32")]
pub use runtime_wasm::{sleep, Duration, Instant};

#[cfg(not(target_arch = "wasm32"))]
mod runtime_native;
#[cfg(not(target_arch = "wasm32"))]
pub use runtime_native::{init_logging, sleep, Duration, Instant};
