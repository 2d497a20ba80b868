//! Detail overlay: Closed -> Open -> Closed.
//!
//! One overlay instance exists per page and binds one record at a time.
//! Opening while already open replaces the record. The overlay is the only
//! owner of the body scroll lock; it sets it on open and clears it on close.

use std::sync::Arc;

use serde::Serialize;

use crate::debug::{self, cat};
use crate::gallery::{Gallery, GalleryEvent, GalleryFrame};
use crate::model::{EntityRecord, NoteBlock, DISPLAY_FIELDS};
use crate::ui_core::focus::trap_focus;
use crate::ui_core::{Effect, FocusTarget, Key, SessionToken};

/// Where a click inside the overlay landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayClick {
    CloseControl,
    Backdrop,
    Content,
}

#[derive(Clone, Debug)]
struct OpenOverlay {
    record: Arc<EntityRecord>,
    session: SessionToken,
    return_focus: Option<FocusTarget>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub key: String,
    pub value: String,
}

/// Everything the overlay displays. Absent data is always `""` or empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OverlayView {
    pub visible: bool,
    pub session: Option<SessionToken>,
    pub portrait: String,
    pub portrait_alt: String,
    pub name: String,
    pub name_en: String,
    pub fields: Vec<FieldView>,
    pub overview: Vec<String>,
    pub details: Vec<String>,
    pub voice: Vec<String>,
    pub link: Vec<String>,
    pub notes: Vec<NoteBlock>,
    /// Current gallery image; `None` is the single-image state.
    pub gallery: Option<GalleryFrame>,
}

impl OverlayView {
    fn bind(record: &EntityRecord, session: SessionToken, gallery: Option<GalleryFrame>) -> Self {
        OverlayView {
            visible: true,
            session: Some(session),
            portrait: record.img.clone(),
            portrait_alt: record.name.clone(),
            name: record.name.clone(),
            name_en: record.name_en.clone(),
            fields: DISPLAY_FIELDS
                .iter()
                .map(|k| FieldView {
                    key: k.to_string(),
                    value: record.field(k).to_string(),
                })
                .collect(),
            overview: record.overview.clone(),
            details: record.details.clone(),
            voice: record.voice.clone(),
            link: record.link.clone(),
            notes: record.notes.clone(),
            gallery,
        }
    }
}

#[derive(Debug)]
pub struct Overlay {
    open: Option<OpenOverlay>,
    gallery: Gallery,
    scroll_locked: bool,
    next_session: u64,
}

impl Overlay {
    pub fn new(swipe_threshold: f64) -> Self {
        Overlay {
            open: None,
            gallery: Gallery::new(swipe_threshold),
            scroll_locked: false,
            next_session: 1,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn record(&self) -> Option<&Arc<EntityRecord>> {
        self.open.as_ref().map(|o| &o.record)
    }

    pub fn session(&self) -> Option<SessionToken> {
        self.open.as_ref().map(|o| o.session)
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    fn set_scroll_lock(&mut self, locked: bool, effects: &mut Vec<Effect>) {
        if self.scroll_locked != locked {
            self.scroll_locked = locked;
            effects.push(Effect::SetScrollLock { locked });
        }
    }

    /// Bind `record` and show the overlay. `prior_focus` is where focus
    /// returns on close; reopening while open keeps the original one.
    pub fn open(&mut self, record: Arc<EntityRecord>, prior_focus: Option<FocusTarget>) -> Vec<Effect> {
        let session = SessionToken(self.next_session);
        self.next_session += 1;

        let return_focus = match self.open.take() {
            Some(previous) => previous.return_focus,
            None => prior_focus,
        };

        debug::log(
            cat::OVERLAY,
            format!("open '{}' (session {})", record.label(), session.0),
        );

        let mut effects = self.gallery.activate(record.images.clone(), session);
        self.open = Some(OpenOverlay {
            record,
            session,
            return_focus,
        });

        effects.push(Effect::ResetOverlayScroll);
        self.set_scroll_lock(true, &mut effects);
        effects.push(Effect::focus(FocusTarget::OverlayClose));
        effects
    }

    /// Hide the overlay. A no-op when already closed.
    pub fn close(&mut self) -> Vec<Effect> {
        let Some(open) = self.open.take() else {
            return Vec::new();
        };
        debug::log(cat::OVERLAY, format!("close (session {})", open.session.0));

        let mut effects = self.gallery.clear();
        self.set_scroll_lock(false, &mut effects);
        if let Some(target) = open.return_focus {
            effects.push(Effect::focus(target));
        }
        effects
    }

    pub fn click(&mut self, target: OverlayClick) -> Vec<Effect> {
        match target {
            OverlayClick::CloseControl | OverlayClick::Backdrop => self.close(),
            OverlayClick::Content => Vec::new(),
        }
    }

    /// Document-level keys while open: Escape closes, Tab is trapped.
    ///
    /// `focusables` is the number of enabled focusable elements inside the
    /// overlay and `focused` the index of the one holding focus.
    pub fn on_key(&mut self, key: &Key, shift: bool, focusables: usize, focused: Option<usize>) -> Vec<Effect> {
        if !self.is_open() {
            return Vec::new();
        }
        match key {
            Key::Escape => self.close(),
            Key::Tab => match trap_focus(focusables, focused, shift) {
                Some(i) => vec![Effect::PreventDefault, Effect::focus(FocusTarget::OverlayItem(i))],
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Forward an event from a gallery listener bound under `session`.
    pub fn gallery_event(&mut self, session: SessionToken, event: GalleryEvent) -> Vec<Effect> {
        let open = self.is_open();
        self.gallery.handle(session, event, open)
    }

    pub fn view(&self) -> OverlayView {
        match &self.open {
            Some(open) => OverlayView::bind(&open.record, open.session, self.gallery.frame()),
            None => OverlayView::default(),
        }
    }
}
