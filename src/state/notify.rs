//! Toast notifications.
//!
//! DESIGN
//! ======
//! One notification is visible at a time; the rest wait in FIFO order.
//! In the browser each notification schedules its own dismissal after its
//! duration plus the 300 ms slide-out. Natively nothing is scheduled and
//! callers advance the queue with `finish_current`.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use uuid::Uuid;

use crate::util::format::escape_html;
use crate::view::Screen;

/// Slide-out animation length added to every display duration.
pub const EXIT_ANIMATION: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn default_duration(self) -> Duration {
        Duration::from_millis(match self {
            Self::Success => 5000,
            Self::Error => 7000,
            Self::Warning => 6000,
            Self::Info => 4000,
        })
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub duration: Duration,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: &str, message: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.to_owned(),
            message: message.to_owned(),
            duration: kind.default_duration(),
        }
    }

    pub fn markup(&self) -> String {
        format!(
            r#"<div class="notification {kind}" data-id="{id}"><div class="notification-content"><div class="notification-title">{title}</div><div class="notification-message">{message}</div></div><button class="notification-close" data-action="dismiss-notification" data-target="{id}">&times;</button></div>"#,
            kind = self.kind.css_class(),
            id = self.id,
            title = escape_html(&self.title),
            message = escape_html(&self.message),
        )
    }
}

pub struct Notifier {
    screen: Rc<dyn Screen>,
    current: RefCell<Option<Notification>>,
    queue: RefCell<VecDeque<Notification>>,
}

impl Notifier {
    pub fn new(screen: Rc<dyn Screen>) -> Rc<Self> {
        Rc::new(Self {
            screen,
            current: RefCell::new(None),
            queue: RefCell::new(VecDeque::new()),
        })
    }

    pub fn success(self: &Rc<Self>, title: &str, message: &str) -> Uuid {
        self.push(Notification::new(NotificationKind::Success, title, message))
    }

    pub fn error(self: &Rc<Self>, title: &str, message: &str) -> Uuid {
        self.push(Notification::new(NotificationKind::Error, title, message))
    }

    pub fn warning(self: &Rc<Self>, title: &str, message: &str) -> Uuid {
        self.push(Notification::new(NotificationKind::Warning, title, message))
    }

    pub fn info(self: &Rc<Self>, title: &str, message: &str) -> Uuid {
        self.push(Notification::new(NotificationKind::Info, title, message))
    }

    /// Queue `notification`, showing it at once when nothing is visible.
    pub fn push(self: &Rc<Self>, notification: Notification) -> Uuid {
        let id = notification.id;
        self.queue.borrow_mut().push_back(notification);
        if self.current.borrow().is_none() {
            self.show_next();
        }
        id
    }

    fn show_next(self: &Rc<Self>) {
        let next = self.queue.borrow_mut().pop_front();
        match next {
            Some(notification) => {
                self.screen.show_notification(&notification);
                self.schedule(&notification);
                *self.current.borrow_mut() = Some(notification);
            }
            None => self.screen.clear_notifications(),
        }
    }

    /// Hide the visible notification and show the next one.
    pub fn finish_current(self: &Rc<Self>) {
        if self.current.borrow_mut().take().is_some() {
            self.show_next();
        }
    }

    /// Dismiss `id` if it is the visible one. Stale timers and repeated
    /// clicks are ignored.
    pub fn dismiss(self: &Rc<Self>, id: Uuid) {
        let is_current = self.current.borrow().as_ref().is_some_and(|n| n.id == id);
        if is_current {
            self.finish_current();
        } else {
            self.queue.borrow_mut().retain(|n| n.id != id);
        }
    }

    pub fn clear_all(&self) {
        self.queue.borrow_mut().clear();
        self.current.borrow_mut().take();
        self.screen.clear_notifications();
    }

    pub fn current(&self) -> Option<Notification> {
        self.current.borrow().clone()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    #[cfg(feature = "hydrate")]
    fn schedule(self: &Rc<Self>, notification: &Notification) {
        let weak = Rc::downgrade(self);
        let id = notification.id;
        let delay = notification.duration + EXIT_ANIMATION;
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::sleep(delay).await;
            if let Some(notifier) = weak.upgrade() {
                notifier.dismiss(id);
            }
        });
    }

    #[cfg(not(feature = "hydrate"))]
    fn schedule(self: &Rc<Self>, notification: &Notification) {
        let _ = (self, notification);
    }
}
