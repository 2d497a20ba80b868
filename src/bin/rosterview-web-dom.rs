#![cfg_attr(target_arch = "wasm32", no_main)]

// DOM frontend for rosterview.
//
// The page ships the markup (tab buttons, `[data-json]` catalog targets and
// the `#charModal` skeleton); this binary binds events, forwards them to the
// `Site` state core and applies the effects it returns.
//
// JS side (optional, for inspection and scripted input):
//   import init, { snapshot_json, handle_action_json } from "./rosterview-web-dom.js";
//   await init();
//   const snap = JSON.parse(snapshot_json());
//   const snap2 = JSON.parse(handle_action_json(JSON.stringify({ type: "SelectTab", id: "tab-chars" })));

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use anyhow::{anyhow, Context};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    window, AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement,
    HtmlImageElement, KeyboardEvent, Node, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, TouchEvent, Window,
};

use rosterview::catalog::{CatalogLoader, HttpFetcher, SectionView};
use rosterview::config::{CatalogSource, SiteConfig};
use rosterview::debug;
use rosterview::model::NOTE_BLOCKS;
use rosterview::overlay::OverlayView;
use rosterview::site::{GalleryAction, Site, UiAction};
use rosterview::tabs::TabView;
use rosterview::{BootFragment, ControlId, Effect, FocusTarget, SessionToken};

const CONFIG_SCRIPT_ID: &str = "rosterview-config";
const MODAL_ID: &str = "charModal";
const PHOTO_ID: &str = "photo";
const DOTS_ID: &str = "dots";
const CAPTION_ID: &str = "title";
const SCROLL_LOCK_CLASS: &str = "no-scroll";
const FOCUSABLE: &str =
    "button, [href], input, select, textarea, [tabindex]:not([tabindex=\"-1\"])";

thread_local! {
    static PAGE: RefCell<Option<Rc<Page>>> = RefCell::new(None);
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    // Must run before anything rewrites the fragment.
    let boot = BootFragment::capture(
        window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default(),
    );

    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    debug::init_from_url_and_storage_once();

    match Page::mount(boot) {
        Ok(page) => {
            page.start();
            PAGE.with(|slot| *slot.borrow_mut() = Some(page));
        }
        Err(e) => log::error!("[rosterview] mount failed: {e:#}"),
    }
}

/// Current snapshot as JSON.
#[wasm_bindgen]
pub fn snapshot_json() -> String {
    PAGE.with(|slot| match slot.borrow().as_ref() {
        Some(page) => page.snapshot_json(),
        None => "{}".to_string(),
    })
}

/// Apply a JSON-encoded `UiAction` and return the updated snapshot.
#[wasm_bindgen]
pub fn handle_action_json(action_json: String) -> String {
    let Some(page) = PAGE.with(|slot| slot.borrow().clone()) else {
        return "{}".to_string();
    };
    match serde_json::from_str::<UiAction>(&action_json) {
        Ok(action) => page.dispatch(action, None),
        Err(e) => log::warn!("Failed to deserialize UiAction ({e}): {action_json:?}"),
    }
    page.snapshot_json()
}

// Native builds: just provide a stub main so `cargo build --all-features` doesn't explode.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("rosterview-web-dom is only supported on wasm32 (browser) target.");
}

fn js_err(e: JsValue) -> anyhow::Error {
    anyhow!("{e:?}")
}

/// Inline TOML config if present, otherwise defaults plus `[data-json]`
/// discovery.
fn load_config(document: &Document) -> anyhow::Result<SiteConfig> {
    if let Some(script) = document.get_element_by_id(CONFIG_SCRIPT_ID) {
        let text = script.text_content().unwrap_or_default();
        return SiteConfig::from_toml_str(&text).with_context(|| format!("parsing #{CONFIG_SCRIPT_ID}"));
    }

    let mut config = SiteConfig::default();
    let nodes = document.query_selector_all("[data-json]").map_err(js_err)?;
    for i in 0..nodes.length() {
        let Some(el) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let file = el.get_attribute("data-json").unwrap_or_default();
        if el.id().is_empty() {
            log::warn!("[rosterview] [data-json=\"{file}\"] has no id; skipped");
            continue;
        }
        config.sources.push(CatalogSource::new(&file, &el.id()));
    }
    config.validate().context("validating discovered config")?;
    Ok(config)
}

struct BoundListener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// Listeners attached for one overlay session.
struct GalleryBinding {
    session: SessionToken,
    listeners: Vec<BoundListener>,
}

impl GalleryBinding {
    fn detach(self) {
        for l in self.listeners {
            if let Err(e) = l
                .target
                .remove_event_listener_with_callback(l.kind, l.closure.as_ref().unchecked_ref())
            {
                log::warn!("[rosterview] removing {} listener failed: {e:?}", l.kind);
            }
        }
    }
}

struct Page {
    window: Window,
    document: Document,
    site: RefCell<Site>,
    gallery: RefCell<Option<GalleryBinding>>,
    rendered_sections: RefCell<HashMap<String, String>>,
    rendered_session: Cell<Option<SessionToken>>,
    rendered_frame: Cell<Option<usize>>,
}

impl Page {
    fn mount(boot: BootFragment) -> anyhow::Result<Rc<Page>> {
        let window = window().context("no window")?;
        let document = window.document().context("no document")?;
        let config = load_config(&document)?;
        log::info!(
            "[rosterview] {} tab(s), {} catalog source(s)",
            config.tabs.len(),
            config.sources.len()
        );

        Ok(Rc::new(Page {
            site: RefCell::new(Site::new(config, boot)),
            gallery: RefCell::new(None),
            rendered_sections: RefCell::new(HashMap::new()),
            rendered_session: Cell::new(None),
            rendered_frame: Cell::new(None),
            window,
            document,
        }))
    }

    fn start(self: &Rc<Self>) {
        let effects = self.site.borrow_mut().init();
        self.render();
        self.apply(effects, None);

        if let Err(e) = self.bind_static() {
            log::error!("[rosterview] binding listeners failed: {e:?}");
        }
        self.spawn_deep_link();
        self.spawn_loader();
    }

    fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.site.borrow().snapshot()).unwrap_or_else(|e| {
            log::error!("Failed to serialize SiteSnapshot: {e}");
            "{}".to_string()
        })
    }

    fn dispatch(self: &Rc<Self>, action: UiAction, event: Option<&Event>) {
        let effects = self.site.borrow_mut().dispatch(action);
        self.render();
        self.apply(effects, event);
    }

    // ---- async tasks -------------------------------------------------------

    fn spawn_deep_link(self: &Rc<Self>) {
        // Subscribe before the loader starts so no install is missed.
        let (resolver, rendered) = {
            let mut site = self.site.borrow_mut();
            let rendered = site.subscribe_rendered();
            (site.take_deep_link(), rendered)
        };
        let Some(resolver) = resolver else { return };

        let page = Rc::clone(self);
        spawn_local(async move {
            let lookup_page = Rc::clone(&page);
            let resolution = resolver
                .run(rendered, move |token| lookup_page.site.borrow().find_control(token))
                .await;
            let effects = page.site.borrow_mut().complete_deep_link(resolution);
            page.render();
            page.apply(effects, None);
        });
    }

    fn spawn_loader(self: &Rc<Self>) {
        let (sources, base) = {
            let site = self.site.borrow();
            (site.config().sources.clone(), site.config().base())
        };
        let origin = self.window.location().origin().unwrap_or_default();
        let page = Rc::clone(self);
        spawn_local(async move {
            let loader = CatalogLoader::new(HttpFetcher::with_origin(origin), base);
            loader
                .load_all(&sources, |index, _, load| {
                    page.site.borrow_mut().install(index, load);
                    page.render();
                })
                .await;
            log::info!("[rosterview] catalog loading finished");
        });
    }

    // ---- listeners ---------------------------------------------------------

    fn listen<F>(target: &EventTarget, kind: &str, handler: F) -> Result<(), JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        // Page-lifetime listener.
        closure.forget();
        Ok(())
    }

    fn bind_static(self: &Rc<Self>) -> Result<(), JsValue> {
        let (tabs, sources) = {
            let site = self.site.borrow();
            (site.tabs().tabs().to_vec(), site.config().sources.clone())
        };

        for tab in &tabs {
            let Some(el) = self.document.get_element_by_id(&tab.id) else {
                continue;
            };
            let page = Rc::clone(self);
            let id = tab.id.clone();
            Self::listen(&el, "click", move |ev| {
                page.dispatch(UiAction::SelectTab { id: id.clone() }, Some(&ev));
            })?;
            let page = Rc::clone(self);
            Self::listen(&el, "keydown", move |ev| {
                if let Some(kev) = ev.dyn_ref::<KeyboardEvent>() {
                    page.dispatch(UiAction::TabKey { key: kev.key() }, Some(&ev));
                }
            })?;
        }

        for source in &sources {
            let Some(root) = self.document.get_element_by_id(&source.target) else {
                continue;
            };
            let page = Rc::clone(self);
            Self::listen(&root, "click", move |ev| {
                if let Some(control) = control_from_event(&ev) {
                    page.dispatch(
                        UiAction::ActivateControl {
                            control,
                            prior_focus: Some(FocusTarget::Control(control)),
                        },
                        Some(&ev),
                    );
                }
            })?;
        }

        if let Some(modal) = self.document.get_element_by_id(MODAL_ID) {
            let page = Rc::clone(self);
            Self::listen(&modal, "click", move |ev| {
                let Some(el) = event_element(&ev) else { return };
                if matches!(el.closest(".modal__close, [data-close]"), Ok(Some(_))) {
                    page.dispatch(UiAction::CloseOverlay, Some(&ev));
                } else if el.matches(".modal__overlay").unwrap_or(false) {
                    page.dispatch(UiAction::BackdropClick, Some(&ev));
                }
            })?;
        }

        if let Some(dots) = self.document.get_element_by_id(DOTS_ID) {
            let page = Rc::clone(self);
            Self::listen(&dots, "click", move |ev| {
                let Some(session) = page.site.borrow().overlay().session() else {
                    return;
                };
                let index = event_element(&ev)
                    .and_then(|el| el.closest(".dot").ok().flatten())
                    .and_then(|dot| dot.get_attribute("data-index"))
                    .and_then(|i| i.parse().ok());
                if let Some(index) = index {
                    page.dispatch(
                        UiAction::Gallery {
                            session,
                            event: GalleryAction::Dot { index },
                        },
                        Some(&ev),
                    );
                }
            })?;
        }

        let page = Rc::clone(self);
        Self::listen(&self.document, "keydown", move |ev| {
            let Some(kev) = ev.dyn_ref::<KeyboardEvent>() else { return };
            if !page.site.borrow().overlay().is_open() {
                return;
            }
            let focusables = page.overlay_focusables();
            let focused = page.document.active_element().and_then(|active| {
                let node: &Node = &active;
                focusables.iter().position(|f| f.is_same_node(Some(node)))
            });
            page.dispatch(
                UiAction::OverlayKey {
                    key: kev.key(),
                    shift: kev.shift_key(),
                    focusables: focusables.len(),
                    focused,
                },
                Some(&ev),
            );
        })?;

        Ok(())
    }

    fn gallery_listener<F>(
        self: &Rc<Self>,
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        session: SessionToken,
        mut to_action: F,
    ) -> Result<BoundListener, JsValue>
    where
        F: FnMut(&Event) -> Option<GalleryAction> + 'static,
    {
        let page: Weak<Page> = Rc::downgrade(self);
        let closure = Closure::wrap(Box::new(move |ev: Event| {
            let (Some(page), Some(event)) = (page.upgrade(), to_action(&ev)) else {
                return;
            };
            page.dispatch(UiAction::Gallery { session, event }, Some(&ev));
        }) as Box<dyn FnMut(Event)>);

        if passive {
            let opts = AddEventListenerOptions::new();
            opts.set_passive(true);
            target.add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &opts,
            )?;
        } else {
            target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        }

        Ok(BoundListener {
            target: target.clone(),
            kind,
            closure,
        })
    }

    fn bind_gallery(self: &Rc<Self>, session: SessionToken) -> Result<(), JsValue> {
        let Some(modal) = self.document.get_element_by_id(MODAL_ID) else {
            return Ok(());
        };
        let (Some(photo), Some(prev), Some(next)) = (
            self.document.get_element_by_id(PHOTO_ID),
            modal.query_selector(".arrow-btn.prev")?,
            modal.query_selector(".arrow-btn.next")?,
        ) else {
            return Ok(());
        };
        let win: &EventTarget = &self.window;

        let listeners = vec![
            self.gallery_listener(&prev, "click", false, session, |_| Some(GalleryAction::Prev))?,
            self.gallery_listener(&next, "click", false, session, |_| Some(GalleryAction::Next))?,
            self.gallery_listener(win, "keydown", false, session, |ev| {
                ev.dyn_ref::<KeyboardEvent>()
                    .map(|k| GalleryAction::Key { key: k.key() })
            })?,
            self.gallery_listener(&photo, "touchstart", true, session, |ev| {
                touch_x(ev).map(|x| GalleryAction::TouchStart { x })
            })?,
            self.gallery_listener(&photo, "touchend", true, session, |ev| {
                touch_x(ev).map(|x| GalleryAction::TouchEnd { x })
            })?,
        ];

        if let Some(old) = self
            .gallery
            .borrow_mut()
            .replace(GalleryBinding { session, listeners })
        {
            old.detach();
        }
        Ok(())
    }

    fn unbind_gallery(&self, session: SessionToken) {
        let mut slot = self.gallery.borrow_mut();
        if slot.as_ref().map(|b| b.session) == Some(session) {
            if let Some(binding) = slot.take() {
                binding.detach();
            }
        }
    }

    // ---- effects -----------------------------------------------------------

    fn apply(self: &Rc<Self>, effects: Vec<Effect>, event: Option<&Event>) {
        for effect in effects {
            if let Err(e) = self.apply_one(effect, event) {
                log::warn!("[rosterview] effect failed: {e:?}");
            }
        }
    }

    fn apply_one(self: &Rc<Self>, effect: Effect, event: Option<&Event>) -> Result<(), JsValue> {
        match effect {
            Effect::ReplaceFragment { fragment } => {
                self.window
                    .history()?
                    .replace_state_with_url(&JsValue::NULL, "", Some(&fragment))?;
            }
            Effect::Focus { target } => {
                if let Some(el) = self.focus_element(&target) {
                    if el.is_connected() {
                        el.focus()?;
                    }
                }
            }
            Effect::ScrollIntoView { control } => {
                if let Some(el) = self.control_element(control) {
                    let opts = ScrollIntoViewOptions::new();
                    opts.set_behavior(ScrollBehavior::Smooth);
                    opts.set_block(ScrollLogicalPosition::Center);
                    el.scroll_into_view_with_scroll_into_view_options(&opts);
                }
            }
            Effect::ResetOverlayScroll => {
                if let Some(content) = self.document.query_selector(".modal__content")? {
                    content.set_scroll_top(0);
                }
            }
            Effect::SetScrollLock { locked } => {
                if let Some(body) = self.document.body() {
                    if locked {
                        body.class_list().add_1(SCROLL_LOCK_CLASS)?;
                    } else {
                        body.class_list().remove_1(SCROLL_LOCK_CLASS)?;
                    }
                }
            }
            Effect::Prefetch { src } => {
                HtmlImageElement::new()?.set_src(&src);
            }
            Effect::BindGallery { session } => self.bind_gallery(session)?,
            Effect::UnbindGallery { session } => self.unbind_gallery(session),
            Effect::PreventDefault => {
                if let Some(ev) = event {
                    ev.prevent_default();
                }
            }
        }
        Ok(())
    }

    fn focus_element(&self, target: &FocusTarget) -> Option<HtmlElement> {
        let el = match target {
            FocusTarget::Tab(i) => {
                let id = self.site.borrow().tabs().tabs().get(*i)?.id.clone();
                self.document.get_element_by_id(&id)
            }
            FocusTarget::Control(id) => self.control_element(*id),
            FocusTarget::OverlayClose => self
                .document
                .get_element_by_id(MODAL_ID)?
                .query_selector(".modal__close")
                .ok()
                .flatten(),
            FocusTarget::OverlayItem(i) => {
                return self.overlay_focusables().into_iter().nth(*i);
            }
            FocusTarget::Element(id) => self.document.get_element_by_id(id),
        };
        el.and_then(|e| e.dyn_into::<HtmlElement>().ok())
    }

    fn control_element(&self, control: ControlId) -> Option<Element> {
        self.document
            .query_selector(&format!(".char[data-control=\"{}\"]", control.0))
            .ok()
            .flatten()
    }

    fn overlay_focusables(&self) -> Vec<HtmlElement> {
        let Some(modal) = self.document.get_element_by_id(MODAL_ID) else {
            return Vec::new();
        };
        let Ok(nodes) = modal.query_selector_all(FOCUSABLE) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|n| n.dyn_into::<HtmlElement>().ok())
            .filter(|el| !el.has_attribute("disabled"))
            .collect()
    }

    // ---- rendering ---------------------------------------------------------

    fn render(&self) {
        let snapshot = self.site.borrow().snapshot();
        if let Err(e) = self.render_tabs(&snapshot.tabs) {
            log::warn!("[rosterview] rendering tabs failed: {e:?}");
        }
        for section in &snapshot.sections {
            if let Err(e) = self.render_section(section) {
                log::warn!("[rosterview] rendering {} failed: {e:?}", section.source);
            }
        }
        if let Err(e) = self.render_overlay(&snapshot.overlay) {
            log::warn!("[rosterview] rendering overlay failed: {e:?}");
        }
    }

    fn render_tabs(&self, tabs: &[TabView]) -> Result<(), JsValue> {
        for tab in tabs {
            if let Some(el) = self.html_element(&tab.id) {
                el.set_attribute("aria-selected", tab.aria_selected())?;
                el.set_tab_index(tab.tab_index);
            }
            if let Some(panel) = self.html_element(&tab.panel) {
                panel.set_hidden(tab.panel_hidden);
            }
        }
        Ok(())
    }

    fn render_section(&self, section: &SectionView) -> Result<(), JsValue> {
        if section.status == "pending" {
            return Ok(());
        }
        let fingerprint = format!(
            "{}:{:?}:{}",
            section.status,
            section.groups.iter().flat_map(|g| &g.controls).map(|c| c.control).next(),
            section.groups.iter().map(|g| g.controls.len()).sum::<usize>()
        );
        if self.rendered_sections.borrow().get(&section.target) == Some(&fingerprint) {
            return Ok(());
        }
        let Some(root) = self.document.get_element_by_id(&section.target) else {
            return Ok(());
        };

        let frag = self.document.create_document_fragment();
        if let Some(message) = &section.message {
            let p = self.document.create_element("p")?;
            p.set_class_name("load-error");
            p.set_text_content(Some(message));
            frag.append_child(&p)?;
        }
        for group in &section.groups {
            let h2 = self.document.create_element("h2")?;
            h2.set_class_name("char-group");
            h2.set_text_content(Some(&group.title));
            frag.append_child(&h2)?;

            let grid = self.document.create_element("div")?;
            grid.set_class_name("char-grid");
            for c in &group.controls {
                let btn = self
                    .document
                    .create_element("button")?
                    .dyn_into::<HtmlElement>()?;
                btn.set_class_name("char");
                btn.set_attribute("type", "button")?;
                btn.set_attribute("data-control", &c.control.0.to_string())?;
                btn.set_attribute("data-id", &c.id)?;
                btn.set_attribute("data-name", &c.name)?;
                btn.set_attribute("data-name-en", &c.name_en)?;
                if !c.focus_y.is_empty() {
                    btn.style().set_property("--focus-y", &c.focus_y)?;
                }

                let shell = self.document.create_element("span")?;
                shell.set_class_name("char-img");
                let img = self.document.create_element("img")?;
                img.set_attribute("loading", "lazy")?;
                img.set_attribute("src", &c.img)?;
                img.set_attribute("alt", &c.name)?;
                shell.append_child(&img)?;

                let name = self.document.create_element("span")?;
                name.set_class_name("char-name");
                name.set_text_content(Some(&c.name));

                btn.append_child(&shell)?;
                btn.append_child(&name)?;
                grid.append_child(&btn)?;
            }
            frag.append_child(&grid)?;
        }

        root.set_inner_html("");
        root.append_child(&frag)?;
        self.rendered_sections
            .borrow_mut()
            .insert(section.target.clone(), fingerprint);
        debug::log(debug::cat::CATALOG, format!("rendered #{}", section.target));
        Ok(())
    }

    fn render_overlay(&self, view: &OverlayView) -> Result<(), JsValue> {
        let Some(modal) = self.html_element(MODAL_ID) else {
            return Ok(());
        };
        modal.set_hidden(!view.visible);
        if !view.visible {
            self.rendered_session.set(None);
            self.rendered_frame.set(None);
            return Ok(());
        }

        if self.rendered_session.get() != view.session {
            self.render_record(view)?;
            self.build_dots(view)?;
            self.rendered_session.set(view.session);
            self.rendered_frame.set(None);
        }

        let index = view.gallery.as_ref().map(|f| f.index);
        if self.rendered_frame.get() != index || index.is_none() {
            self.render_frame(view)?;
            self.rendered_frame.set(index);
        }
        Ok(())
    }

    fn render_record(&self, view: &OverlayView) -> Result<(), JsValue> {
        if let Some(img) = self.image("pImg") {
            img.set_src(&view.portrait);
            img.set_alt(&view.portrait_alt);
        }
        self.set_text("pNameJp", &view.name);
        self.set_text("pNameEn", &view.name_en);
        for field in &view.fields {
            self.set_text(&field_element_id(&field.key), &field.value);
        }
        self.set_paragraphs("pDetails", &view.details)?;
        self.set_paragraphs("pOverview", &view.overview)?;
        self.set_paragraphs("pVoice", &view.voice)?;
        self.set_paragraphs("pLink", &view.link)?;
        for i in 0..NOTE_BLOCKS {
            let note = view.notes.get(i);
            self.set_text(&format!("pT{}", i + 1), note.map(|n| n.title.as_str()).unwrap_or(""));
            self.set_paragraphs(
                &format!("pN{}", i + 1),
                note.map(|n| n.paragraphs.as_slice()).unwrap_or(&[]),
            )?;
        }
        Ok(())
    }

    fn build_dots(&self, view: &OverlayView) -> Result<(), JsValue> {
        let Some(dots) = self.document.get_element_by_id(DOTS_ID) else {
            return Ok(());
        };
        dots.set_inner_html("");
        let Some(frame) = &view.gallery else {
            return Ok(());
        };
        for i in 0..frame.len {
            let d = self.document.create_element("div")?;
            d.set_class_name("dot");
            d.set_attribute("data-index", &i.to_string())?;
            dots.append_child(&d)?;
        }
        Ok(())
    }

    fn render_frame(&self, view: &OverlayView) -> Result<(), JsValue> {
        let photo = self.image(PHOTO_ID);
        match &view.gallery {
            Some(frame) => {
                if let Some(photo) = photo {
                    photo.set_src(&frame.src);
                    photo.set_alt(&frame.alt);
                }
                self.set_text(CAPTION_ID, &frame.caption);
                if let Some(dots) = self.document.get_element_by_id(DOTS_ID) {
                    let nodes = dots.query_selector_all(".dot")?;
                    for i in 0..nodes.length() {
                        if let Some(dot) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                            let active = frame.dots.get(i as usize).copied().unwrap_or(false);
                            dot.class_list().toggle_with_force("active", active)?;
                        }
                    }
                }
            }
            None => {
                if let Some(photo) = photo {
                    photo.remove_attribute("src")?;
                    photo.set_alt("");
                }
                self.set_text(CAPTION_ID, "");
            }
        }
        Ok(())
    }

    // ---- small DOM helpers -------------------------------------------------

    fn html_element(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    }

    fn image(&self, id: &str) -> Option<HtmlImageElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlImageElement>().ok())
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_paragraphs(&self, id: &str, paragraphs: &[String]) -> Result<(), JsValue> {
        let Some(el) = self.document.get_element_by_id(id) else {
            return Ok(());
        };
        el.set_inner_html("");
        for para in paragraphs {
            let p = self.document.create_element("p")?;
            p.set_text_content(Some(para));
            el.append_child(&p)?;
        }
        Ok(())
    }
}

/// `sex` -> `pSex`.
fn field_element_id(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => format!("p{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

fn event_element(ev: &Event) -> Option<Element> {
    ev.target().and_then(|t| t.dyn_into::<Element>().ok())
}

fn control_from_event(ev: &Event) -> Option<ControlId> {
    let el = event_element(ev)?.closest(".char").ok()??;
    el.get_attribute("data-control")?.parse().ok().map(ControlId)
}

fn touch_x(ev: &Event) -> Option<f64> {
    let touch = ev.dyn_ref::<TouchEvent>()?.changed_touches().get(0)?;
    Some(f64::from(touch.client_x()))
}
