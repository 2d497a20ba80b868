//! Renderer-agnostic UI vocabulary shared by every controller.
//!
//! Controllers never touch the DOM. They mutate their own state and return
//! [`Effect`]s; the DOM adapter applies them and re-renders from a snapshot.

pub mod effect;
pub mod focus;
pub mod input;

pub use effect::{ControlId, Effect, FocusTarget, GalleryListener, SessionToken};
pub use input::Key;
