//! Navigation controller: turns a location into exactly one page activation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Entry points are `start` (first load), `navigate`/`replace` (code asks
//! to go somewhere) and `on_location_change` (the user moved through
//! history or edited the fragment). All of them run the same algorithm
//! against the `RouteTable`, the `Session` gate and the `PageHost`.
//!
//! DESIGN
//! ======
//! Each run:
//! 1. splits the location into path and query and resolves the path;
//! 2. sends root and unmatched paths to the fallback (dashboard when
//!    signed in, else login);
//! 3. redirects to login when the route needs a session and there is none,
//!    then to dashboard when the user's role is not allowed;
//! 4. sets the title, awaits `PageHost::load`, and activates the page.
//!
//! A redirect pushes the new fragment and loops back to step 1, bounded by
//! `MAX_REDIRECTS`. Every run takes a new generation number; a page whose
//! load finishes after a newer run started is discarded, never mounted.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here returns `Err`. Outcomes are reported as `Navigation`
//! values; a failing page load is logged and shown through
//! `Screen::show_error`, and the current route stays where it was.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::rc::Rc;

use async_trait::async_trait;

use super::location::Location;
use super::query::{self, QueryMap};
use super::table::{RouteTable, normalize_path};
use crate::state::session::Session;
use crate::view::Screen;

pub const LOGIN_ROUTE: &str = "#/login";
pub const DASHBOARD_ROUTE: &str = "#/dashboard";

/// Upper bound on consecutive redirects within one navigation.
pub const MAX_REDIRECTS: usize = 8;

/// What a page receives on activation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteContext {
    pub params: BTreeMap<String, String>,
    pub query: QueryMap,
    /// Matched pattern, e.g. `#/pegawai/:id`.
    pub route: String,
}

impl RouteContext {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentRoute {
    pub pattern: String,
    pub params: BTreeMap<String, String>,
    pub query: QueryMap,
}

/// Terminal state of one navigation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Activated(CurrentRoute),
    /// The page failed to load; the previous page stays.
    Failed { route: String, message: String },
    /// A newer navigation started while this one was loading.
    Superseded,
    /// The fallback route is not registered.
    Unresolved { path: String },
    RedirectLoop { path: String },
}

impl Navigation {
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::Activated(current) => Some(&current.pattern),
            _ => None,
        }
    }
}

/// Builds and swaps pages for the navigator.
#[async_trait(?Send)]
pub trait PageHost {
    /// Handler key stored in the route table.
    type Kind: Clone;
    type Page;
    type Error: Display;

    /// Construct and initialize the page for `kind`. A page that fails to
    /// initialize is cleaned up by the host.
    async fn load(&self, kind: &Self::Kind, context: &RouteContext) -> Result<Self::Page, Self::Error>;

    /// Tear down the outgoing page, then render and mount `page`.
    fn activate(&self, page: Self::Page, context: &RouteContext);

    /// Tear down a page that will never be mounted.
    fn discard(&self, page: Self::Page);
}

enum Decision<K> {
    Redirect(String),
    Unresolved(String),
    Activate {
        kind: K,
        title: String,
        context: RouteContext,
    },
}

pub struct Navigator<H: PageHost> {
    routes: RouteTable<H::Kind>,
    session: Rc<Session>,
    location: Rc<dyn Location>,
    screen: Rc<dyn Screen>,
    host: H,
    current: RefCell<Option<CurrentRoute>>,
    generation: Cell<u64>,
}

impl<H: PageHost> Navigator<H> {
    pub fn new(
        routes: RouteTable<H::Kind>,
        session: Rc<Session>,
        location: Rc<dyn Location>,
        screen: Rc<dyn Screen>,
        host: H,
    ) -> Self {
        Self {
            routes,
            session,
            location,
            screen,
            host,
            current: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn routes(&self) -> &RouteTable<H::Kind> {
        &self.routes
    }

    /// Handle whatever the location shows on first load.
    pub async fn start(&self) -> Navigation {
        self.run(self.location.fragment()).await
    }

    /// Push `path` with `query` as a new history entry and handle it.
    pub async fn navigate(&self, path: &str, query: &[(&str, Option<&str>)]) -> Navigation {
        let target = query::build_location(path, query);
        self.location.push(&target);
        self.run(target).await
    }

    /// Like `navigate`, but overwrites the current history entry.
    pub async fn replace(&self, path: &str, query: &[(&str, Option<&str>)]) -> Navigation {
        let target = query::build_location(path, query);
        self.location.replace(&target);
        self.run(target).await
    }

    /// Handle the location's current fragment after an external change.
    pub async fn on_location_change(&self) -> Navigation {
        self.run(self.location.fragment()).await
    }

    /// Step back in history. The resulting location change drives the
    /// activation.
    pub fn back(&self) {
        self.location.back();
    }

    pub fn forward(&self) {
        self.location.forward();
    }

    /// The location's current fragment.
    pub fn fragment(&self) -> String {
        self.location.fragment()
    }

    /// Value of `key` in the current location's query.
    pub fn query_param(&self, key: &str) -> Option<String> {
        let fragment = self.location.fragment();
        let (_, raw) = query::split_location(&fragment);
        raw.map(query::parse).and_then(|mut q| q.remove(key))
    }

    pub fn current_route(&self) -> Option<CurrentRoute> {
        self.current.borrow().clone()
    }

    /// Generation of the most recent navigation run.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    async fn run(&self, location: String) -> Navigation {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let mut target = location;
        for _ in 0..=MAX_REDIRECTS {
            match self.decide(&target) {
                Decision::Redirect(next) => {
                    log::debug!("redirect {target} -> {next}");
                    self.location.push(&next);
                    target = next;
                }
                Decision::Unresolved(path) => {
                    log::error!("no route registered for fallback {path}");
                    return Navigation::Unresolved { path };
                }
                Decision::Activate { kind, title, context } => {
                    return self.activate(generation, &kind, &title, context).await;
                }
            }
        }
        log::error!("too many redirects ending at {target}");
        Navigation::RedirectLoop { path: target }
    }

    fn decide(&self, location: &str) -> Decision<H::Kind> {
        let (path, raw_query) = query::split_location(location);
        let path = normalize_path(path);

        let Some(matched) = self.routes.resolve(&path) else {
            return self.fallback();
        };
        let route = matched.route;

        if route.auth_required && !self.session.is_authenticated() {
            return Decision::Redirect(LOGIN_ROUTE.to_owned());
        }
        if !route.roles.is_empty() && !self.session.has_permission(&route.roles) {
            return Decision::Redirect(DASHBOARD_ROUTE.to_owned());
        }

        Decision::Activate {
            kind: route.handler.clone(),
            title: route.title.clone(),
            context: RouteContext {
                params: matched.params,
                query: raw_query.map(query::parse).unwrap_or_default(),
                route: route.pattern.clone(),
            },
        }
    }

    fn fallback(&self) -> Decision<H::Kind> {
        let target = if self.session.is_authenticated() {
            DASHBOARD_ROUTE
        } else {
            LOGIN_ROUTE
        };
        if self.routes.resolve(target).is_some() {
            Decision::Redirect(target.to_owned())
        } else {
            Decision::Unresolved(target.to_owned())
        }
    }

    async fn activate(
        &self,
        generation: u64,
        kind: &H::Kind,
        title: &str,
        context: RouteContext,
    ) -> Navigation {
        self.screen.set_title(title);
        let loaded = self.host.load(kind, &context).await;

        if self.generation.get() != generation {
            if let Ok(page) = loaded {
                self.host.discard(page);
            }
            log::debug!("navigation to {} superseded", context.route);
            return Navigation::Superseded;
        }

        match loaded {
            Ok(page) => {
                self.screen.clear_error();
                self.host.activate(page, &context);
                let current = CurrentRoute {
                    pattern: context.route,
                    params: context.params,
                    query: context.query,
                };
                *self.current.borrow_mut() = Some(current.clone());
                self.screen.scroll_to_top();
                Navigation::Activated(current)
            }
            Err(e) => {
                let message = e.to_string();
                log::error!("page for {} failed to load: {message}", context.route);
                self.screen.show_error(&message);
                Navigation::Failed {
                    route: context.route,
                    message,
                }
            }
        }
    }
}
