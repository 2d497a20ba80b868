//! Rosterview - catalog pages with shareable deep links
//!
//! A catalog of named entities is loaded from JSON documents, rendered as
//! activatable controls, and shown in a detail overlay with an image gallery.
//! The visible tab and the opened entity are reflected in the URL fragment
//! (`#tab=chars&char=aria`) so any state can be shared as a link.
//!
//! ## Architecture
//!
//! - **State core** (this library): tab, catalog, deep-link, overlay and
//!   gallery controllers composed in [`site::Site`]. Controllers return
//!   [`ui_core::Effect`]s instead of touching the page, so everything runs
//!   in native tests.
//! - **DOM adapter** (`rosterview-web-dom` binary, wasm32): captures the boot
//!   fragment, forwards DOM events as [`site::UiAction`]s and applies effects.
//!
//! ## Usage
//!
//! ```bash
//! trunk build --features dom-web
//! ```

// Fragment and path handling
pub mod fragment;
pub mod paths;

// Data document contract
pub mod model;

// Site configuration
pub mod config;

// Debug logging system (available on all platforms)
pub mod debug;

// Platform abstraction layer (sleep, Instant, logging)
pub mod platform;

// Effects, focus and key types shared by the controllers
pub mod ui_core;

// Controllers
pub mod catalog;
pub mod deeplink;
pub mod gallery;
pub mod overlay;
pub mod tabs;

// Composition root
pub mod site;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogLoader, DocumentFetcher, HttpFetcher, LoadError, SectionLoad};
pub use config::{CatalogSource, ConfigError, SiteConfig, TabDescriptor};
pub use deeplink::{BootFragment, DeepLinkResolver, Resolution};
pub use model::{EntityRecord, GalleryImage};
pub use site::{Site, SiteSnapshot, UiAction};
pub use ui_core::{ControlId, Effect, FocusTarget, SessionToken};
