use serde::{Deserialize, Serialize};

/// Position of a rendered catalog control, in document order.
///
/// Ids are only valid for the catalog generation that produced them;
/// re-rendering a section invalidates its controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlId(pub usize);

/// Identifies one overlay-open session. Gallery listeners are bound under it
/// and events carrying any other token are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub u64);

/// Something that can take keyboard focus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum FocusTarget {
    /// Tab button by index in the tab group.
    Tab(usize),
    /// A catalog control.
    Control(ControlId),
    /// The overlay's close control.
    OverlayClose,
    /// Focusable element inside the overlay, by index among its focusables.
    OverlayItem(usize),
    /// Any other element, by DOM id.
    Element(String),
}

/// Gallery listener kinds, bound and unbound as a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum GalleryListener {
    PrevClick,
    NextClick,
    WindowKeydown,
    TouchStart,
    TouchEnd,
}

impl GalleryListener {
    pub const ALL: [GalleryListener; 5] = [
        GalleryListener::PrevClick,
        GalleryListener::NextClick,
        GalleryListener::WindowKeydown,
        GalleryListener::TouchStart,
        GalleryListener::TouchEnd,
    ];
}

/// A side effect requested by a controller.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Effect {
    /// `history.replaceState(null, "", <fragment>)`; never a push.
    ReplaceFragment { fragment: String },
    /// Move keyboard focus.
    Focus { target: FocusTarget },
    /// Scroll a catalog control into view (smooth, centred).
    ScrollIntoView { control: ControlId },
    /// Reset the overlay content's scroll position to the top.
    ResetOverlayScroll,
    /// Toggle the body-level background scroll lock.
    SetScrollLock { locked: bool },
    /// Start loading an image ahead of navigation.
    Prefetch { src: String },
    /// Attach gallery listeners for a session.
    BindGallery { session: SessionToken },
    /// Detach every gallery listener bound for a session.
    UnbindGallery { session: SessionToken },
    /// Suppress the browser's default handling of the current event.
    PreventDefault,
}

impl Effect {
    pub fn replace_fragment(fragment: impl Into<String>) -> Self {
        Effect::ReplaceFragment {
            fragment: fragment.into(),
        }
    }

    pub fn focus(target: FocusTarget) -> Self {
        Effect::Focus { target }
    }
}
