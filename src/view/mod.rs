//! Output side of the client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navigator, the notifier and the shell never touch the DOM directly.
//! They talk to a `Screen`: `BrowserScreen` renders into the document,
//! `MemoryScreen` records every call for tests.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

pub mod layout;

use std::cell::{Cell, RefCell};

use crate::state::notify::Notification;

/// Everything the client shows to the user.
pub trait Screen {
    /// Route title; the implementation decides the final document title.
    fn set_title(&self, title: &str);
    fn scroll_to_top(&self);
    /// Replace the page area with `markup`.
    fn mount(&self, markup: &str);
    fn show_error(&self, message: &str);
    /// Hide the error shown by `show_error`, if any.
    fn clear_error(&self);
    fn show_notification(&self, notification: &Notification);
    fn clear_notifications(&self);
}

/// Document title for a route title.
pub fn document_title(title: &str, app_name: &str) -> String {
    format!("{title} - {app_name}")
}

/// Screen that records what it was asked to show.
pub struct MemoryScreen {
    app_name: String,
    title: RefCell<String>,
    scrolls: Cell<usize>,
    mounted: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
    visible_error: RefCell<Option<String>>,
    notifications: RefCell<Vec<Notification>>,
    visible_notification: RefCell<Option<Notification>>,
}

impl MemoryScreen {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_owned(),
            title: RefCell::new(String::new()),
            scrolls: Cell::new(0),
            mounted: RefCell::new(Vec::new()),
            errors: RefCell::new(Vec::new()),
            visible_error: RefCell::new(None),
            notifications: RefCell::new(Vec::new()),
            visible_notification: RefCell::new(None),
        }
    }

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls.get()
    }

    pub fn mount_count(&self) -> usize {
        self.mounted.borrow().len()
    }

    /// Most recently mounted markup.
    pub fn page(&self) -> Option<String> {
        self.mounted.borrow().last().cloned()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    pub fn visible_error(&self) -> Option<String> {
        self.visible_error.borrow().clone()
    }

    /// Every notification shown, in display order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    pub fn visible_notification(&self) -> Option<Notification> {
        self.visible_notification.borrow().clone()
    }
}

impl Screen for MemoryScreen {
    fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = document_title(title, &self.app_name);
    }

    fn scroll_to_top(&self) {
        self.scrolls.set(self.scrolls.get() + 1);
    }

    fn mount(&self, markup: &str) {
        self.mounted.borrow_mut().push(markup.to_owned());
    }

    fn show_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_owned());
        *self.visible_error.borrow_mut() = Some(message.to_owned());
    }

    fn clear_error(&self) {
        self.visible_error.borrow_mut().take();
    }

    fn show_notification(&self, notification: &Notification) {
        self.notifications.borrow_mut().push(notification.clone());
        *self.visible_notification.borrow_mut() = Some(notification.clone());
    }

    fn clear_notifications(&self) {
        self.visible_notification.borrow_mut().take();
    }
}

#[cfg(feature = "hydrate")]
pub use browser::BrowserScreen;

#[cfg(feature = "hydrate")]
mod browser {
    use super::{Screen, document_title};
    use crate::state::notify::Notification;
    use crate::util::format::escape_html;

    const ROOT_ID: &str = "app";
    const ERROR_ID: &str = "page-error";
    const NOTIFICATION_ID: &str = "notification-container";

    /// Renders into `#app` of the current document.
    pub struct BrowserScreen {
        app_name: String,
    }

    impl BrowserScreen {
        pub fn new(app_name: &str) -> Self {
            Self {
                app_name: app_name.to_owned(),
            }
        }

        fn document() -> Option<web_sys::Document> {
            web_sys::window().and_then(|w| w.document())
        }

        fn element(id: &str) -> Option<web_sys::Element> {
            Self::document()?.get_element_by_id(id)
        }

        /// Element with `id`, created under `<body>` when missing.
        fn ensure_element(id: &str, class: &str) -> Option<web_sys::Element> {
            if let Some(el) = Self::element(id) {
                return Some(el);
            }
            let document = Self::document()?;
            let el = document.create_element("div").ok()?;
            el.set_id(id);
            el.set_class_name(class);
            document.body()?.append_child(&el).ok()?;
            Some(el)
        }
    }

    impl Screen for BrowserScreen {
        fn set_title(&self, title: &str) {
            if let Some(document) = Self::document() {
                document.set_title(&document_title(title, &self.app_name));
            }
        }

        fn scroll_to_top(&self) {
            if let Some(window) = web_sys::window() {
                window.scroll_to_with_x_and_y(0.0, 0.0);
            }
        }

        fn mount(&self, markup: &str) {
            match Self::element(ROOT_ID) {
                Some(root) => root.set_inner_html(markup),
                None => log::error!("#{ROOT_ID} is missing; cannot mount page"),
            }
        }

        fn show_error(&self, message: &str) {
            if let Some(el) = Self::ensure_element(ERROR_ID, "page-error") {
                el.set_inner_html(&format!(
                    r#"<div class="alert alert-danger" role="alert">{}</div>"#,
                    escape_html(message)
                ));
            }
        }

        fn clear_error(&self) {
            if let Some(el) = Self::element(ERROR_ID) {
                el.set_inner_html("");
            }
        }

        fn show_notification(&self, notification: &Notification) {
            if let Some(el) = Self::ensure_element(NOTIFICATION_ID, "notification-container") {
                el.set_inner_html(&notification.markup());
            }
        }

        fn clear_notifications(&self) {
            if let Some(el) = Self::element(NOTIFICATION_ID) {
                el.set_inner_html("");
            }
        }
    }
}
