//! The location fragment and its history.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Navigator` writes the fragment through `push`/`replace` and reads it
//! back on startup and on every location change. `MemoryLocation` keeps an
//! in-process history stack; `BrowserLocation` wraps `window.location`.
//!
//! DESIGN
//! ======
//! Writing `location.hash` in the browser fires `hashchange`. The navigator
//! has already handled its own writes, so `BrowserLocation` remembers each
//! fragment it wrote and `take_echo` lets the event listener skip them.

#[cfg(test)]
#[path = "location_test.rs"]
mod location_test;

use std::cell::{Cell, RefCell};

pub trait Location {
    /// Current fragment including the leading `#` and any query, or `""`.
    fn fragment(&self) -> String;
    /// New history entry.
    fn push(&self, fragment: &str);
    /// Overwrite the current history entry.
    fn replace(&self, fragment: &str);
    fn back(&self);
    fn forward(&self);
}

/// History stack held in memory. Emits no change events; the owner calls
/// `Navigator::on_location_change` after `back`/`forward`.
pub struct MemoryLocation {
    entries: RefCell<Vec<String>>,
    index: Cell<usize>,
}

impl MemoryLocation {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: RefCell::new(vec![initial.to_owned()]),
            index: Cell::new(0),
        }
    }

    /// All entries, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn position(&self) -> usize {
        self.index.get()
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl Location for MemoryLocation {
    fn fragment(&self) -> String {
        self.entries
            .borrow()
            .get(self.index.get())
            .cloned()
            .unwrap_or_default()
    }

    fn push(&self, fragment: &str) {
        let mut entries = self.entries.borrow_mut();
        let next = self.index.get() + 1;
        entries.truncate(next);
        entries.push(fragment.to_owned());
        self.index.set(next);
    }

    fn replace(&self, fragment: &str) {
        if let Some(entry) = self.entries.borrow_mut().get_mut(self.index.get()) {
            fragment.clone_into(entry);
        }
    }

    fn back(&self) {
        let index = self.index.get();
        if index > 0 {
            self.index.set(index - 1);
        }
    }

    fn forward(&self) {
        let index = self.index.get();
        if index + 1 < self.entries.borrow().len() {
            self.index.set(index + 1);
        }
    }
}

/// Fragment part (`#...`) of a full URL, `""` when there is none.
pub fn fragment_of(url: &str) -> &str {
    url.find('#').map_or("", |i| &url[i..])
}

/// Bookkeeping for fragments written by the app and not yet observed as a
/// change event.
#[derive(Default)]
pub struct EchoQueue {
    pending: RefCell<Vec<String>>,
}

impl EchoQueue {
    pub fn expect(&self, fragment: &str) {
        self.pending.borrow_mut().push(fragment.to_owned());
    }

    /// True when `fragment` is one of our own writes. Only the oldest
    /// matching entry is consumed; each write echoes once.
    pub fn take(&self, fragment: &str) -> bool {
        let mut pending = self.pending.borrow_mut();
        match pending.iter().position(|f| f == fragment) {
            Some(i) => {
                pending.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

#[cfg(feature = "hydrate")]
pub use browser::BrowserLocation;

#[cfg(feature = "hydrate")]
mod browser {
    use super::{EchoQueue, Location};

    #[derive(Default)]
    pub struct BrowserLocation {
        echoes: EchoQueue,
    }

    impl BrowserLocation {
        pub fn new() -> Self {
            Self::default()
        }

        /// See [`EchoQueue::take`].
        pub fn take_echo(&self, fragment: &str) -> bool {
            self.echoes.take(fragment)
        }

        fn location() -> Option<web_sys::Location> {
            web_sys::window().map(|w| w.location())
        }
    }

    impl Location for BrowserLocation {
        fn fragment(&self) -> String {
            Self::location()
                .and_then(|l| l.hash().ok())
                .unwrap_or_default()
        }

        fn push(&self, fragment: &str) {
            if self.fragment() == fragment {
                return;
            }
            let Some(location) = Self::location() else {
                return;
            };
            self.echoes.expect(fragment);
            if location.set_hash(fragment).is_err() {
                self.echoes.take(fragment);
                log::warn!("could not set location hash to {fragment}");
            }
        }

        fn replace(&self, fragment: &str) {
            if self.fragment() == fragment {
                return;
            }
            let Some(location) = Self::location() else {
                return;
            };
            self.echoes.expect(fragment);
            if location.replace(fragment).is_err() {
                self.echoes.take(fragment);
                log::warn!("could not replace location with {fragment}");
            }
        }

        fn back(&self) {
            if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
                let _ = history.back();
            }
        }

        fn forward(&self) {
            if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
                let _ = history.forward();
            }
        }
    }
}
