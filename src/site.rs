//! Composition root.
//!
//! `Site` owns every controller and is the only place they meet. The DOM
//! adapter feeds it [`UiAction`]s, applies the returned [`Effect`]s and renders
//! a [`SiteSnapshot`]. Nothing here touches the DOM, so the whole flow
//! (boot fragment, catalog arrival, deep link, overlay, gallery) runs in
//! native tests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::catalog::{Catalog, SectionLoad, SectionView};
use crate::config::SiteConfig;
use crate::debug::{self, cat};
use crate::deeplink::{BootFragment, DeepLinkIntent, DeepLinkResolver, Resolution};
use crate::fragment::CanonicalFragment;
use crate::gallery::GalleryEvent;
use crate::model::EntityRecord;
use crate::overlay::{Overlay, OverlayClick, OverlayView};
use crate::tabs::{TabController, TabView};
use crate::ui_core::{ControlId, Effect, FocusTarget, Key, SessionToken};

/// Gallery input, as sent by the adapter's bound listeners.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind")]
pub enum GalleryAction {
    Prev,
    Next,
    Dot { index: usize },
    Key { key: String },
    TouchStart { x: f64 },
    TouchEnd { x: f64 },
}

impl From<GalleryAction> for GalleryEvent {
    fn from(action: GalleryAction) -> Self {
        match action {
            GalleryAction::Prev => GalleryEvent::Prev,
            GalleryAction::Next => GalleryEvent::Next,
            GalleryAction::Dot { index } => GalleryEvent::Dot(index),
            GalleryAction::Key { key } => GalleryEvent::Key(Key::from_dom(&key)),
            GalleryAction::TouchStart { x } => GalleryEvent::TouchStart(x),
            GalleryAction::TouchEnd { x } => GalleryEvent::TouchEnd(x),
        }
    }
}

/// Actions the adapter can send.
///
/// These are intentionally small and high-level; the adapter owns DOM
/// details, the site owns state.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum UiAction {
    /// Pointer selection of a tab by DOM id.
    SelectTab { id: String },
    /// Key pressed while focus is inside the tab group.
    TabKey { key: String },
    /// A catalog control was activated (click or synthesized).
    ActivateControl {
        control: ControlId,
        prior_focus: Option<FocusTarget>,
    },
    /// Click on the overlay's close control.
    CloseOverlay,
    /// Click on the dimmed backdrop.
    BackdropClick,
    /// Document-level key while the overlay may be open.
    OverlayKey {
        key: String,
        shift: bool,
        focusables: usize,
        focused: Option<usize>,
    },
    /// Event from a gallery listener bound under `session`.
    Gallery {
        session: SessionToken,
        event: GalleryAction,
    },
}

/// Complete render state.
#[derive(Clone, Debug, Serialize)]
pub struct SiteSnapshot {
    pub tabs: Vec<TabView>,
    pub sections: Vec<SectionView>,
    pub overlay: OverlayView,
    pub scroll_locked: bool,
}

pub struct Site {
    config: SiteConfig,
    boot: BootFragment,
    intent: DeepLinkIntent,
    tabs: TabController,
    catalog: Catalog,
    overlay: Overlay,
    resolver: Option<DeepLinkResolver>,
    deep_link_fired: bool,
}

impl Site {
    pub fn new(config: SiteConfig, boot: BootFragment) -> Self {
        let intent = DeepLinkIntent::from_boot(&boot, &config.chars_tab);
        let resolver = DeepLinkResolver::new(&intent, config.deep_link_timeout());
        Site {
            tabs: TabController::new(config.tabs.clone()),
            catalog: Catalog::new(&config.sources),
            overlay: Overlay::new(config.swipe_threshold_px),
            resolver: Some(resolver),
            deep_link_fired: false,
            intent,
            boot,
            config,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn boot(&self) -> &BootFragment {
        &self.boot
    }

    pub fn intent(&self) -> &DeepLinkIntent {
        &self.intent
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Initial tab selection from the boot fragment. Rewrites the fragment
    /// to its canonical tab-only form.
    pub fn init(&mut self) -> Vec<Effect> {
        self.tabs.init_from_fragment(&self.boot.decode())
    }

    /// Hand out the deep-link resolver. Only the first call gets one.
    pub fn take_deep_link(&mut self) -> Option<DeepLinkResolver> {
        self.resolver.take()
    }

    pub fn subscribe_rendered(&self) -> watch::Receiver<u64> {
        self.catalog.subscribe()
    }

    pub fn find_control(&self, token: &str) -> Option<ControlId> {
        self.catalog.find_by_identity(token)
    }

    /// Install a loaded (or failed) catalog section by declaration index.
    pub fn install(&mut self, section: usize, load: SectionLoad) -> bool {
        self.catalog.install(section, load)
    }

    /// Apply a deep-link resolution: scroll the control into view, run the
    /// normal activation path, then drop `char=` from the fragment. Effective
    /// at most once per `Site`.
    pub fn complete_deep_link(&mut self, resolution: Resolution) -> Vec<Effect> {
        let Resolution::Matched(control) = resolution else {
            return Vec::new();
        };
        if self.deep_link_fired {
            debug::log(cat::DEEPLINK, "ignoring second deep-link activation");
            return Vec::new();
        }

        let mut effects = vec![Effect::ScrollIntoView { control }];
        let activated = self.activate(control, Some(FocusTarget::Control(control)));
        if activated.is_empty() {
            return Vec::new();
        }
        self.deep_link_fired = true;
        effects.extend(activated);
        effects.push(Effect::replace_fragment(
            CanonicalFragment::tab(self.config.chars_tab.as_str()).to_string(),
        ));
        effects
    }

    pub fn deep_link_fired(&self) -> bool {
        self.deep_link_fired
    }

    /// Open the overlay for a catalog control. Stale ids do nothing.
    pub fn activate(&mut self, control: ControlId, prior_focus: Option<FocusTarget>) -> Vec<Effect> {
        match self.catalog.record(control) {
            Some(record) => self.open_record(record, prior_focus),
            None => {
                debug::log(cat::OVERLAY, format!("activate: no control {}", control.0));
                Vec::new()
            }
        }
    }

    pub fn open_record(&mut self, record: Arc<EntityRecord>, prior_focus: Option<FocusTarget>) -> Vec<Effect> {
        self.overlay.open(record, prior_focus)
    }

    pub fn dispatch(&mut self, action: UiAction) -> Vec<Effect> {
        debug::log(cat::INPUT, format!("{action:?}"));
        match action {
            UiAction::SelectTab { id } => self.tabs.select(&id),
            UiAction::TabKey { key } => self.tabs.on_key(&Key::from_dom(&key)).unwrap_or_default(),
            UiAction::ActivateControl {
                control,
                prior_focus,
            } => self.activate(control, prior_focus),
            UiAction::CloseOverlay => self.overlay.click(OverlayClick::CloseControl),
            UiAction::BackdropClick => self.overlay.click(OverlayClick::Backdrop),
            UiAction::OverlayKey {
                key,
                shift,
                focusables,
                focused,
            } => self
                .overlay
                .on_key(&Key::from_dom(&key), shift, focusables, focused),
            UiAction::Gallery { session, event } => {
                self.overlay.gallery_event(session, event.into())
            }
        }
    }

    pub fn snapshot(&self) -> SiteSnapshot {
        SiteSnapshot {
            tabs: self.tabs.view(),
            sections: self.catalog.view(),
            overlay: self.overlay.view(),
            scroll_locked: self.overlay.scroll_locked(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LoadedGroup;
    use crate::config::CatalogSource;

    fn site(boot: &str) -> Site {
        let config = SiteConfig {
            sources: vec![CatalogSource::new("data/chars.json", "chars")],
            ..SiteConfig::default()
        };
        Site::new(config, BootFragment::capture(boot))
    }

    fn aria() -> SectionLoad {
        SectionLoad::Loaded(vec![LoadedGroup {
            title: "Main".into(),
            records: vec![EntityRecord {
                id: "aria".into(),
                name: "Aria".into(),
                ..EntityRecord::default()
            }],
        }])
    }

    #[test]
    fn test_init_selects_tab_from_boot_fragment() {
        let mut s = site("#tab=chars&char=aria");
        let effects = s.init();
        assert_eq!(s.tabs().active().unwrap().token, "chars");
        assert_eq!(effects, vec![Effect::replace_fragment("#tab=chars")]);
        assert_eq!(s.boot().raw(), "#tab=chars&char=aria");

        let mut s = site("#char=aria");
        assert_eq!(s.init(), vec![Effect::replace_fragment("#tab=world")]);
        assert_eq!(s.tabs().active().unwrap().token, "world");
    }

    #[test]
    fn test_resolver_is_handed_out_once() {
        let mut s = site("#tab=chars&char=aria");
        assert_eq!(s.take_deep_link().unwrap().token(), Some("aria"));
        assert!(s.take_deep_link().is_none());
    }

    #[test]
    fn test_complete_deep_link_fires_once() {
        let mut s = site("#tab=chars&char=aria");
        s.install(0, aria());
        let id = s.find_control("aria").unwrap();

        let effects = s.complete_deep_link(Resolution::Matched(id));
        assert_eq!(effects.first(), Some(&Effect::ScrollIntoView { control: id }));
        assert_eq!(effects.last(), Some(&Effect::replace_fragment("#tab=chars")));
        assert!(s.overlay().is_open());

        s.dispatch(UiAction::CloseOverlay);
        assert!(s.complete_deep_link(Resolution::Matched(id)).is_empty());
        assert!(!s.overlay().is_open());
    }

    #[test]
    fn test_expired_resolution_has_no_effect() {
        let mut s = site("#tab=chars&char=zed");
        assert!(s.complete_deep_link(Resolution::Expired).is_empty());
        assert!(!s.deep_link_fired());
    }

    #[test]
    fn test_actions_deserialize_from_json() {
        let mut s = site("");
        s.init();
        s.install(0, aria());

        let action: UiAction = serde_json::from_str(
            r#"{"type":"ActivateControl","control":0,"prior_focus":{"kind":"Tab","value":1}}"#,
        )
        .unwrap();
        s.dispatch(action);
        assert!(s.overlay().is_open());

        let action: UiAction = serde_json::from_str(
            r#"{"type":"OverlayKey","key":"Escape","shift":false,"focusables":2,"focused":null}"#,
        )
        .unwrap();
        let effects = s.dispatch(action);
        assert!(!s.overlay().is_open());
        assert_eq!(effects.last(), Some(&Effect::focus(FocusTarget::Tab(1))));

        let action: UiAction = serde_json::from_str(r#"{"type":"TabKey","key":"End"}"#).unwrap();
        s.dispatch(action);
        assert_eq!(s.tabs().active().unwrap().token, "chars");
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut s = site("");
        s.init();
        s.install(0, aria());
        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["tabs"][0]["selected"], true);
        assert_eq!(json["sections"][0]["status"], "rendered");
        assert_eq!(json["sections"][0]["groups"][0]["controls"][0]["id"], "aria");
        assert_eq!(json["overlay"]["visible"], false);
        assert_eq!(json["scroll_locked"], false);
    }
}
