//! Image gallery inside the overlay.
//!
//! The gallery is active only while the bound record carries images. Its
//! listeners (prev/next buttons, window keydown, touch start/end) are bound
//! as one set under the overlay's [`SessionToken`] and unbound exactly once,
//! on close or before the next record is bound. Events tagged with any other
//! session are dropped, so a late event from a previous open has no effect.

use serde::Serialize;

use crate::config::DEFAULT_SWIPE_THRESHOLD_PX;
use crate::debug::{self, cat};
use crate::model::GalleryImage;
use crate::ui_core::{Effect, GalleryListener, Key, SessionToken};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved right: show the previous image.
    Prev,
    /// Finger moved left: show the next image.
    Next,
}

/// Horizontal swipe detector: one touch start, one touch end.
#[derive(Clone, Debug)]
pub struct SwipeTracker {
    start_x: Option<f64>,
    threshold: f64,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD_PX)
    }
}

impl SwipeTracker {
    pub fn new(threshold: f64) -> Self {
        SwipeTracker {
            start_x: None,
            threshold,
        }
    }

    pub fn start(&mut self, x: f64) {
        self.start_x = Some(x);
    }

    /// Finish a gesture. Drags no longer than the threshold are ignored, as
    /// is an end without a start.
    pub fn end(&mut self, x: f64) -> Option<SwipeDirection> {
        let start = self.start_x.take()?;
        let dx = x - start;
        if dx.abs() <= self.threshold {
            return None;
        }
        Some(if dx < 0.0 {
            SwipeDirection::Next
        } else {
            SwipeDirection::Prev
        })
    }

    pub fn reset(&mut self) {
        self.start_x = None;
    }
}

/// The listener set bound for one session.
#[derive(Clone, Debug, Default)]
pub struct ListenerRegistry {
    session: Option<SessionToken>,
    bound: Vec<GalleryListener>,
}

impl ListenerRegistry {
    /// Record the full listener set under `session`. Any set still bound must
    /// be unbound first.
    fn bind(&mut self, session: SessionToken) {
        debug_assert!(self.session.is_none(), "gallery listeners bound twice");
        self.session = Some(session);
        self.bound = GalleryListener::ALL.to_vec();
    }

    /// Drain the bound set. Returns `None` if nothing was bound, so a second
    /// call is a no-op.
    fn unbind(&mut self) -> Option<(SessionToken, Vec<GalleryListener>)> {
        let session = self.session.take()?;
        Some((session, std::mem::take(&mut self.bound)))
    }

    pub fn session(&self) -> Option<SessionToken> {
        self.session
    }

    pub fn is_bound(&self, session: SessionToken) -> bool {
        self.session == Some(session)
    }

    pub fn bound(&self) -> &[GalleryListener] {
        &self.bound
    }
}

/// Input routed to the gallery by a bound listener.
#[derive(Clone, Debug, PartialEq)]
pub enum GalleryEvent {
    Prev,
    Next,
    Dot(usize),
    Key(Key),
    TouchStart(f64),
    TouchEnd(f64),
}

/// What the overlay's photo area should display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GalleryFrame {
    pub index: usize,
    pub len: usize,
    pub src: String,
    pub alt: String,
    pub caption: String,
    /// One entry per indicator dot; `true` marks the active one.
    pub dots: Vec<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct Gallery {
    images: Vec<GalleryImage>,
    index: usize,
    listeners: ListenerRegistry,
    swipe: SwipeTracker,
}

impl Gallery {
    pub fn new(swipe_threshold: f64) -> Self {
        Gallery {
            swipe: SwipeTracker::new(swipe_threshold),
            ..Gallery::default()
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Current index, `None` when there are no images.
    pub fn index(&self) -> Option<usize> {
        (!self.images.is_empty()).then_some(self.index)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Bind a new image sequence for `session`, replacing whatever was bound.
    /// An empty sequence leaves the gallery cleared (single-image mode).
    pub fn activate(&mut self, images: Vec<GalleryImage>, session: SessionToken) -> Vec<Effect> {
        let mut effects = self.clear();
        if images.is_empty() {
            return effects;
        }

        self.images = images;
        self.index = 0;
        self.listeners.bind(session);
        debug::log(
            cat::GALLERY,
            format!("bound {} image(s) for session {}", self.images.len(), session.0),
        );
        effects.push(Effect::BindGallery { session });
        effects.extend(self.show(0));
        effects
    }

    /// Unbind listeners and drop the image sequence.
    pub fn clear(&mut self) -> Vec<Effect> {
        let effects: Vec<Effect> = self.teardown().into_iter().collect();
        self.images.clear();
        self.index = 0;
        self.swipe.reset();
        effects
    }

    /// Unbind the current listener set, if any. Idempotent.
    pub fn teardown(&mut self) -> Option<Effect> {
        let (session, kinds) = self.listeners.unbind()?;
        debug::log(
            cat::GALLERY,
            format!("unbound {} listener(s) for session {}", kinds.len(), session.0),
        );
        Some(Effect::UnbindGallery { session })
    }

    /// Show image `i`, wrapping in both directions (`show(-1)` is the last).
    /// Neighbours are prefetched.
    pub fn show(&mut self, i: isize) -> Vec<Effect> {
        let len = self.images.len();
        if len == 0 {
            return Vec::new();
        }
        self.index = i.rem_euclid(len as isize) as usize;

        let mut effects = Vec::new();
        if len > 1 {
            let next = (self.index + 1) % len;
            let prev = (self.index + len - 1) % len;
            effects.push(Effect::Prefetch {
                src: self.images[next].src.clone(),
            });
            if prev != next {
                effects.push(Effect::Prefetch {
                    src: self.images[prev].src.clone(),
                });
            }
        }
        effects
    }

    pub fn next(&mut self) -> Vec<Effect> {
        self.show(self.index as isize + 1)
    }

    pub fn prev(&mut self) -> Vec<Effect> {
        self.show(self.index as isize - 1)
    }

    /// Route an event from a bound listener. Stale sessions and keys while the
    /// overlay is closed have no effect.
    pub fn handle(&mut self, session: SessionToken, event: GalleryEvent, overlay_open: bool) -> Vec<Effect> {
        if !self.listeners.is_bound(session) {
            debug::log(
                cat::GALLERY,
                format!("dropped {event:?} from stale session {}", session.0),
            );
            return Vec::new();
        }
        match event {
            GalleryEvent::Prev => self.prev(),
            GalleryEvent::Next => self.next(),
            GalleryEvent::Dot(i) if i < self.images.len() => self.show(i as isize),
            GalleryEvent::Dot(_) => Vec::new(),
            GalleryEvent::Key(key) if overlay_open => match key {
                Key::ArrowLeft => self.prev(),
                Key::ArrowRight => self.next(),
                _ => Vec::new(),
            },
            GalleryEvent::Key(_) => Vec::new(),
            GalleryEvent::TouchStart(x) => {
                self.swipe.start(x);
                Vec::new()
            }
            GalleryEvent::TouchEnd(x) => match self.swipe.end(x) {
                Some(SwipeDirection::Prev) => self.prev(),
                Some(SwipeDirection::Next) => self.next(),
                None => Vec::new(),
            },
        }
    }

    pub fn frame(&self) -> Option<GalleryFrame> {
        let image = self.images.get(self.index)?;
        Some(GalleryFrame {
            index: self.index,
            len: self.images.len(),
            src: image.src.clone(),
            alt: image.alt.clone(),
            caption: image.caption.clone(),
            dots: (0..self.images.len()).map(|i| i == self.index).collect(),
        })
    }
}
