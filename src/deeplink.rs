//! One-shot deep-link resolution.
//!
//! A link like `#tab=chars&char=aria` must open the overlay for `aria` once
//! the catalog has rendered it. Two things make this awkward:
//!
//! - tab initialisation rewrites the fragment to `#tab=<token>`, which
//!   destroys `char=`. The fragment is therefore captured as the very first
//!   thing at boot ([`BootFragment`]) and only that copy is consulted.
//! - the catalog loads asynchronously, so the control may not exist yet. The
//!   resolver tries immediately, then waits on "catalog rendered"
//!   notifications, retrying on each, until it matches or a hard deadline
//!   passes.
//!
//! [`DeepLinkResolver::run`] consumes the resolver, so a page load can
//! auto-activate at most one control.

use futures::future::{self, Either};
use futures::pin_mut;
use tokio::sync::watch;

use crate::debug::{self, cat};
use crate::fragment::{self, FragmentState};
use crate::platform::{self, Duration, Instant};
use crate::ui_core::ControlId;

/// The raw fragment exactly as it was when the program started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootFragment(String);

impl BootFragment {
    /// Must run before anything can rewrite the fragment.
    pub fn capture(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        debug::log(cat::ROUTER, format!("boot fragment: {raw:?}"));
        BootFragment(raw)
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> FragmentState {
        fragment::decode(&self.0)
    }
}

/// What the boot fragment asks for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeepLinkIntent {
    /// The fragment named the characters tab.
    pub open_chars_tab: bool,
    /// Identity token of the entity to open.
    pub char_token: Option<String>,
}

impl DeepLinkIntent {
    pub fn from_boot(boot: &BootFragment, chars_tab: &str) -> Self {
        let state = boot.decode();
        DeepLinkIntent {
            open_chars_tab: state.tab() == Some(chars_tab),
            char_token: state.char_token().map(str::to_string),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The boot fragment carried no `char=`.
    NoRequest,
    /// A control matched; activate it.
    Matched(ControlId),
    /// The deadline passed without a match.
    Expired,
    /// The catalog went away before a match.
    Abandoned,
}

#[derive(Clone, Debug)]
pub struct DeepLinkResolver {
    token: Option<String>,
    timeout: Duration,
}

impl DeepLinkResolver {
    pub fn new(intent: &DeepLinkIntent, timeout: Duration) -> Self {
        DeepLinkResolver {
            token: intent.char_token.clone(),
            timeout,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Resolve the requested token.
    ///
    /// `lookup` is tried synchronously first, then again after every
    /// notification on `rendered`, until it returns a control or `timeout`
    /// elapses. `rendered` should be subscribed before the catalog starts
    /// loading so no notification is missed.
    pub async fn run<L>(self, mut rendered: watch::Receiver<u64>, mut lookup: L) -> Resolution
    where
        L: FnMut(&str) -> Option<ControlId>,
    {
        let Some(token) = self.token else {
            return Resolution::NoRequest;
        };

        if let Some(id) = lookup(&token) {
            debug::log(cat::DEEPLINK, format!("'{token}' matched immediately"));
            return Resolution::Matched(id);
        }

        debug::log(
            cat::DEEPLINK,
            format!("'{token}' not rendered yet, watching for {:?}", self.timeout),
        );
        let started = Instant::now();

        let watcher = async {
            loop {
                if rendered.changed().await.is_err() {
                    return None;
                }
                if let Some(id) = lookup(&token) {
                    return Some(id);
                }
            }
        };
        let deadline = platform::sleep(self.timeout);
        pin_mut!(watcher);
        pin_mut!(deadline);

        match future::select(watcher, deadline).await {
            Either::Left((Some(id), _)) => {
                debug::log(
                    cat::DEEPLINK,
                    format!("'{token}' matched after {:?}", started.elapsed()),
                );
                Resolution::Matched(id)
            }
            Either::Left((None, _)) => {
                log::warn!("catalog closed before deep link '{token}' resolved");
                Resolution::Abandoned
            }
            Either::Right(_) => {
                log::info!("deep link '{token}' not found within {:?}", self.timeout);
                Resolution::Expired
            }
        }
    }
}
