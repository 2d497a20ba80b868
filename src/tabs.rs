//! Tab controller.
//!
//! Owns which panel of the tab group is active. Exactly one tab is selected at
//! any time; only that tab is in the sequential focus order (roving
//! tabindex), and only its panel is visible. Every selection rewrites the
//! fragment to `#tab=<token>` with a history *replace*, so back/forward never
//! walks through tab clicks.

use serde::Serialize;

use crate::config::TabDescriptor;
use crate::debug::{self, cat};
use crate::fragment::{CanonicalFragment, FragmentState};
use crate::ui_core::{Effect, FocusTarget, Key};

/// Render state of one tab button and its panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TabView {
    pub id: String,
    pub panel: String,
    pub selected: bool,
    /// `0` for the active tab, `-1` for the rest.
    pub tab_index: i32,
    pub panel_hidden: bool,
}

impl TabView {
    /// Value for the tab button's `aria-selected` attribute.
    pub fn aria_selected(&self) -> &'static str {
        if self.selected {
            "true"
        } else {
            "false"
        }
    }
}

#[derive(Clone, Debug)]
pub struct TabController {
    tabs: Vec<TabDescriptor>,
    active: usize,
}

impl TabController {
    /// `tabs` must be non-empty (enforced by config validation); the first
    /// tab starts active.
    pub fn new(tabs: Vec<TabDescriptor>) -> Self {
        TabController { tabs, active: 0 }
    }

    pub fn tabs(&self) -> &[TabDescriptor] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&TabDescriptor> {
        self.tabs.get(self.active)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn index_of_token(&self, token: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.token == token)
    }

    /// Select the tab with DOM id `id`. Unknown ids change nothing.
    pub fn select(&mut self, id: &str) -> Vec<Effect> {
        match self.index_of(id) {
            Some(i) => self.select_index(i),
            None => {
                debug::log(cat::TABS, format!("select: unknown tab '{id}'"));
                Vec::new()
            }
        }
    }

    fn select_index(&mut self, index: usize) -> Vec<Effect> {
        let Some(tab) = self.tabs.get(index) else {
            return Vec::new();
        };
        self.active = index;
        debug::log(cat::TABS, format!("selected {} ({})", tab.id, tab.token));
        vec![Effect::replace_fragment(
            CanonicalFragment::tab(tab.token.as_str()).to_string(),
        )]
    }

    /// Apply the fragment present at startup: the tab whose token matches
    /// `tab=`, otherwise the first one.
    pub fn init_from_fragment(&mut self, fragment: &FragmentState) -> Vec<Effect> {
        let index = fragment
            .tab()
            .and_then(|token| self.index_of_token(token))
            .unwrap_or(0);
        self.select_index(index)
    }

    /// Keyboard handling while focus is inside the tab group.
    ///
    /// Arrow keys wrap, Home/End jump. The newly active tab receives focus.
    /// Returns `None` for keys the tab group does not handle.
    pub fn on_key(&mut self, key: &Key) -> Option<Vec<Effect>> {
        let len = self.tabs.len();
        if len == 0 {
            return None;
        }
        let next = match key {
            Key::ArrowRight => (self.active + 1) % len,
            Key::ArrowLeft => (self.active + len - 1) % len,
            Key::Home => 0,
            Key::End => len - 1,
            _ => return None,
        };

        let mut effects = vec![Effect::PreventDefault, Effect::focus(FocusTarget::Tab(next))];
        effects.extend(self.select_index(next));
        Some(effects)
    }

    pub fn view(&self) -> Vec<TabView> {
        self.tabs
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let selected = i == self.active;
                TabView {
                    id: t.id.clone(),
                    panel: t.panel.clone(),
                    selected,
                    tab_index: if selected { 0 } else { -1 },
                    panel_hidden: !selected,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::decode;

    fn three() -> TabController {
        TabController::new(vec![
            TabDescriptor::new("tab-world", "panel-world", "world"),
            TabDescriptor::new("tab-chars", "panel-chars", "chars"),
            TabDescriptor::new("tab-notes", "panel-notes", "notes"),
        ])
    }

    fn assert_exclusive(tabs: &TabController, id: &str) {
        let view = tabs.view();
        let selected: Vec<_> = view.iter().filter(|t| t.selected).collect();
        let shown: Vec<_> = view.iter().filter(|t| !t.panel_hidden).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(shown.len(), 1);
        assert_eq!(selected[0].id, id);
        assert_eq!(shown[0].id, id);
        assert_eq!(selected[0].tab_index, 0);
        assert_eq!(selected[0].aria_selected(), "true");
        assert!(view.iter().filter(|t| !t.selected).all(|t| t.aria_selected() == "false"));
        assert!(view.iter().filter(|t| !t.selected).all(|t| t.tab_index == -1));
    }

    #[test]
    fn test_select_is_exclusive_and_replaces_fragment() {
        let mut tabs = three();
        let effects = tabs.select("tab-chars");
        assert_eq!(effects, vec![Effect::replace_fragment("#tab=chars")]);
        assert_exclusive(&tabs, "tab-chars");

        tabs.select("tab-notes");
        assert_exclusive(&tabs, "tab-notes");
    }

    #[test]
    fn test_unknown_select_is_noop() {
        let mut tabs = three();
        tabs.select("tab-chars");
        assert!(tabs.select("tab-missing").is_empty());
        assert_exclusive(&tabs, "tab-chars");
    }

    #[test]
    fn test_init_from_fragment() {
        let mut tabs = three();
        let effects = tabs.init_from_fragment(&decode("#tab=chars&char=aria"));
        assert_exclusive(&tabs, "tab-chars");
        assert_eq!(effects, vec![Effect::replace_fragment("#tab=chars")]);

        let mut tabs = three();
        tabs.init_from_fragment(&decode("#tab=bogus"));
        assert_exclusive(&tabs, "tab-world");

        let mut tabs = three();
        let effects = tabs.init_from_fragment(&decode(""));
        assert_exclusive(&tabs, "tab-world");
        assert_eq!(effects, vec![Effect::replace_fragment("#tab=world")]);
    }

    #[test]
    fn test_arrow_keys_wrap_and_move_focus() {
        let mut tabs = three();
        let effects = tabs.on_key(&Key::ArrowLeft).unwrap();
        assert_exclusive(&tabs, "tab-notes");
        assert!(effects.contains(&Effect::focus(FocusTarget::Tab(2))));
        assert!(effects.contains(&Effect::replace_fragment("#tab=notes")));

        tabs.on_key(&Key::ArrowRight).unwrap();
        assert_exclusive(&tabs, "tab-world");
        tabs.on_key(&Key::ArrowRight).unwrap();
        assert_exclusive(&tabs, "tab-chars");
    }

    #[test]
    fn test_home_end() {
        let mut tabs = three();
        tabs.on_key(&Key::End).unwrap();
        assert_exclusive(&tabs, "tab-notes");
        tabs.on_key(&Key::Home).unwrap();
        assert_exclusive(&tabs, "tab-world");
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let mut tabs = three();
        tabs.select("tab-chars");
        assert!(tabs.on_key(&Key::Other("x".into())).is_none());
        assert!(tabs.on_key(&Key::Escape).is_none());
        assert_exclusive(&tabs, "tab-chars");
    }
}
