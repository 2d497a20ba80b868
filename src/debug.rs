//! Filterable debug logging.
//!
//! Categories: ROUTER, TABS, CATALOG, DEEPLINK, OVERLAY, GALLERY, INPUT
//! Enable via: ?rvdebug=all or localStorage.setItem('rosterview.debug','deeplink,gallery')
//! Messages go through the `log` facade at debug level, so the installed
//! logger still decides where they end up.

use std::sync::atomic::{AtomicU32, Ordering};

pub mod cat {
    pub const ROUTER: u32 = 1 << 0;
    pub const TABS: u32 = 1 << 1;
    pub const CATALOG: u32 = 1 << 2;
    pub const DEEPLINK: u32 = 1 << 3;
    pub const OVERLAY: u32 = 1 << 4;
    pub const GALLERY: u32 = 1 << 5;
    pub const INPUT: u32 = 1 << 6;
    pub const ALL: u32 = 0xffff_ffff;
}

static MASK: AtomicU32 = AtomicU32::new(0);

#[inline]
fn set(mask: u32) {
    MASK.store(mask, Ordering::Relaxed)
}

#[inline]
pub fn enable(bits: u32) {
    MASK.fetch_or(bits, Ordering::Relaxed);
}

#[inline]
pub fn is(cat: u32) -> bool {
    (MASK.load(Ordering::Relaxed) & cat) != 0
}

#[inline]
pub fn cat_name(cat: u32) -> &'static str {
    match cat {
        c if c == cat::ROUTER => "router",
        c if c == cat::TABS => "tabs",
        c if c == cat::CATALOG => "catalog",
        c if c == cat::DEEPLINK => "deeplink",
        c if c == cat::OVERLAY => "overlay",
        c if c == cat::GALLERY => "gallery",
        c if c == cat::INPUT => "input",
        _ => "misc",
    }
}

/// Parse a comma-separated category list. Returns the resulting mask.
pub fn parse_list(list: &str) -> u32 {
    let mut m: u32 = 0;
    for tok in list.split(',').map(|s| s.trim().to_ascii_lowercase()) {
        match tok.as_str() {
            "" | "none" => m = 0,
            "all" => m = cat::ALL,
            "router" => m |= cat::ROUTER,
            "tabs" => m |= cat::TABS,
            "catalog" => m |= cat::CATALOG,
            "deeplink" => m |= cat::DEEPLINK,
            "overlay" => m |= cat::OVERLAY,
            "gallery" => m |= cat::GALLERY,
            "input" => m |= cat::INPUT,
            _ => {}
        }
    }
    m
}

#[inline]
pub fn set_from_list(list: &str) {
    set(parse_list(list));
}

#[cfg(target_arch = "wasm32")]
pub fn init_from_url_and_storage_once() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        use web_sys::window;
        let Some(win) = window() else { return };
        // URL query: ?rvdebug=deeplink,gallery
        if let Ok(search) = win.location().search() {
            let qs = search.trim_start_matches('?');
            for part in qs.split('&') {
                let (key, val) = part.split_once('=').unwrap_or((part, ""));
                if key.eq_ignore_ascii_case("rvdebug") {
                    let decoded = urlencoding::decode(val)
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|_| val.to_string());
                    set_from_list(&decoded);
                }
            }
        }
        // localStorage: rosterview.debug = "deeplink,gallery"
        if let Ok(Some(storage)) = win.local_storage() {
            if let Ok(Some(v)) = storage.get_item("rosterview.debug") {
                enable(parse_list(&v));
            }
        }
        log(cat::ROUTER, "debug init (wasm) complete");
    });
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_from_url_and_storage_once() {}

#[inline]
pub fn log(cat: u32, msg: impl AsRef<str>) {
    if !is(cat) {
        return;
    }
    log::debug!(target: "rosterview", "[{}] {}", cat_name(cat), msg.as_ref());
}
