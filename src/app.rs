//! Application shell: shared services, the route table and the page host.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AppContext` bundles the services every page needs. `App` owns the
//! navigator, intercepts `#/logout`, and turns user actions into page
//! `handle` calls followed by a re-render or a navigation. In the browser,
//! `browser::install` wires `hashchange`, delegated clicks and form
//! submissions to `App`.
//!
//! ARCHITECTURE
//! ============
//! `AppHost` is the navigator's `PageHost`. It keeps the active page as an
//! `Rc<Page>` so an action can run while the page stays mounted; the
//! `RefCell` holding it is never borrowed across an `.await`.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::net::api::{ApiClient, Transport};
use crate::net::types::Role;
use crate::pages::{Action, Followup, Lifecycle, Page, PageError, PageKind};
use crate::router::location::Location;
use crate::router::navigator::LOGIN_ROUTE;
use crate::router::query::split_location;
use crate::router::table::normalize_path;
use crate::router::{Navigation, Navigator, PageHost, RouteContext, RouteOptions, RouteTable};
use crate::state::notify::Notifier;
use crate::state::session::Session;
use crate::state::storage::{SessionStore, Storage};
use crate::view::layout::{self, LOGOUT_ROUTE};
use crate::view::Screen;

/// Services shared by the shell and every page.
#[derive(Clone)]
pub struct AppContext {
    pub config: Rc<AppConfig>,
    pub store: Rc<SessionStore>,
    pub session: Rc<Session>,
    pub api: Rc<ApiClient>,
    pub notifier: Rc<Notifier>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        storage: Rc<dyn Storage>,
        transport: Rc<dyn Transport>,
        screen: Rc<dyn Screen>,
    ) -> Self {
        let store = Rc::new(SessionStore::new(storage, config.storage_keys.clone()));
        let api = Rc::new(ApiClient::new(transport, store.clone(), &config.api_base));
        let session = Rc::new(Session::new(store.clone(), api.clone()));
        Self {
            config: Rc::new(config),
            store,
            session,
            api,
            notifier: Notifier::new(screen),
        }
    }
}

const STAFF: &[Role] = &[Role::Admin, Role::Hrd];

/// Every page route. The root fallback is the navigator's.
pub fn register_routes() -> RouteTable<PageKind> {
    let mut routes = RouteTable::new();
    routes.register("/login", PageKind::Login, RouteOptions::public().title("Login"));
    routes.register("/dashboard", PageKind::Dashboard, RouteOptions::default().title("Dashboard"));
    routes.register(
        "/pegawai",
        PageKind::Pegawai,
        RouteOptions::default().roles(STAFF).title("Data Pegawai"),
    );
    routes.register(
        "/pegawai/:id",
        PageKind::Pegawai,
        RouteOptions::default().roles(STAFF).title("Detail Pegawai"),
    );
    routes.register("/presensi", PageKind::Presensi, RouteOptions::default().title("Presensi"));
    routes.register("/profile", PageKind::Profile, RouteOptions::default().title("Profile"));
    routes.register(
        "/laporan",
        PageKind::Laporan,
        RouteOptions::default().roles(STAFF).title("Laporan"),
    );
    routes
}

struct Active {
    page: Rc<Page>,
    pattern: String,
}

/// Builds pages and mounts them, wrapped in the layout, on the screen.
pub struct AppHost {
    app: AppContext,
    screen: Rc<dyn Screen>,
    active: RefCell<Option<Active>>,
}

impl AppHost {
    pub fn new(app: AppContext, screen: Rc<dyn Screen>) -> Self {
        Self {
            app,
            screen,
            active: RefCell::new(None),
        }
    }

    pub fn active(&self) -> Option<Rc<Page>> {
        self.active.borrow().as_ref().map(|a| a.page.clone())
    }

    fn is_active(&self, page: &Rc<Page>) -> bool {
        self.active
            .borrow()
            .as_ref()
            .is_some_and(|a| Rc::ptr_eq(&a.page, page))
    }

    /// Render the active page into the screen.
    pub fn render(&self) {
        let active = self.active.borrow();
        let Some(active) = active.as_ref() else {
            return;
        };
        let user = match active.page.kind() {
            PageKind::Login => None,
            _ => self.app.session.user(),
        };
        let markup = layout::wrap(
            user.as_ref(),
            &active.pattern,
            &self.app.config.app_name,
            &active.page.render(),
        );
        self.screen.mount(&markup);
    }

    /// Destroy the active page, leaving nothing mounted.
    fn release(&self) {
        let previous = self.active.borrow_mut().take();
        if let Some(previous) = previous {
            previous.page.destroy();
        }
    }
}

#[async_trait(?Send)]
impl PageHost for AppHost {
    type Kind = PageKind;
    type Page = Rc<Page>;
    type Error = PageError;

    async fn load(&self, kind: &PageKind, context: &RouteContext) -> Result<Rc<Page>, PageError> {
        let page = Page::new(*kind, &self.app);
        if let Err(e) = page.init(context).await {
            page.destroy();
            return Err(e);
        }
        Ok(Rc::new(page))
    }

    fn activate(&self, page: Rc<Page>, context: &RouteContext) {
        self.release();
        *self.active.borrow_mut() = Some(Active {
            page,
            pattern: context.route.clone(),
        });
        self.render();
    }

    fn discard(&self, page: Rc<Page>) {
        page.destroy();
    }
}

fn is_logout(fragment: &str) -> bool {
    let (path, _) = split_location(fragment);
    normalize_path(path) == LOGOUT_ROUTE
}

/// The running client.
pub struct App {
    context: AppContext,
    navigator: Navigator<AppHost>,
}

impl App {
    pub fn new(context: AppContext, location: Rc<dyn Location>, screen: Rc<dyn Screen>) -> Self {
        let host = AppHost::new(context.clone(), screen.clone());
        let navigator = Navigator::new(register_routes(), context.session.clone(), location, screen, host);
        Self { context, navigator }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn navigator(&self) -> &Navigator<AppHost> {
        &self.navigator
    }

    /// Handle the initial location.
    pub async fn start(&self) -> Navigation {
        log::info!(
            "{} {} starting against {}",
            self.context.config.app_name,
            self.context.config.app_version,
            self.context.config.api_base
        );
        self.on_location_change().await
    }

    pub async fn on_location_change(&self) -> Navigation {
        let fragment = self.navigator.fragment();
        if is_logout(&fragment) {
            return self.logout().await;
        }
        self.navigator.on_location_change().await
    }

    pub async fn navigate(&self, target: &str) -> Navigation {
        if is_logout(target) {
            return self.logout().await;
        }
        self.navigator.navigate(target, &[]).await
    }

    /// Clear the session and show the login page.
    pub async fn logout(&self) -> Navigation {
        log::info!("logging out");
        self.context.session.logout();
        self.context.notifier.clear_all();
        self.navigator.host().release();
        self.navigator.replace(LOGIN_ROUTE, &[]).await
    }

    /// Run a user action against the active page. Returns the navigation
    /// it caused, if any.
    pub async fn dispatch(&self, action: &Action) -> Option<Navigation> {
        if action.name == "dismiss-notification" {
            match Uuid::parse_str(action.target()) {
                Ok(id) => self.context.notifier.dismiss(id),
                Err(e) => log::warn!("bad notification id {:?}: {e}", action.target()),
            }
            return None;
        }

        let host = self.navigator.host();
        let page = host.active()?;
        match page.handle(action).await {
            Ok(Followup::Stay) => {
                if host.is_active(&page) {
                    host.render();
                }
                None
            }
            Ok(Followup::Navigate(target)) => Some(self.navigate(&target).await),
            Err(PageError::Unauthenticated) => {
                log::warn!("session missing during {}", action.name);
                Some(self.logout().await)
            }
            Err(e) => {
                log::error!("action {} failed: {e}", action.name);
                self.context.notifier.error("Error", &e.to_string());
                None
            }
        }
    }
}

#[cfg(feature = "hydrate")]
pub mod browser {
    //! DOM event wiring for [`App`](super::App).

    use std::collections::BTreeMap;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;

    use super::App;
    use crate::pages::Action;
    use crate::router::location::{BrowserLocation, Location, fragment_of};

    /// The `data-action` element for a click, if any. Form elements are
    /// handled on submit instead.
    fn click_action(event: &web_sys::Event) -> Option<Action> {
        let target = event.target()?.dyn_into::<web_sys::Element>().ok()?;
        let element = target.closest("[data-action]").ok()??;
        if element.tag_name().eq_ignore_ascii_case("form") {
            return None;
        }
        let name = element.get_attribute("data-action")?;
        Some(Action {
            name,
            target: element.get_attribute("data-target"),
            fields: BTreeMap::new(),
        })
    }

    fn submit_action(event: &web_sys::Event) -> Option<Action> {
        let form = event.target()?.dyn_into::<web_sys::HtmlFormElement>().ok()?;
        let name = form.get_attribute("data-action")?;
        let mut fields = BTreeMap::new();
        let data = web_sys::FormData::new_with_form(&form).ok()?;
        if let Ok(Some(entries)) = js_sys::try_iter(&data) {
            for entry in entries.flatten() {
                let pair = js_sys::Array::from(&entry);
                if let (Some(key), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                    fields.insert(key, value);
                }
            }
        }
        Some(Action {
            name,
            target: form.get_attribute("data-target"),
            fields,
        })
    }

    fn listen(
        target: &web_sys::EventTarget,
        kind: &str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        // Listeners live as long as the page.
        closure.forget();
        Ok(())
    }

    /// Attach the document listeners and handle the initial location.
    ///
    /// # Errors
    ///
    /// Fails when the window or document is unavailable or a listener
    /// cannot be attached.
    pub fn install(app: Rc<App>, location: Rc<BrowserLocation>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let on_hash = app.clone();
        listen(&window, "hashchange", move |event| {
            // Several writes in one navigation queue several events; each
            // names its own target in `newURL`.
            let fragment = match event.dyn_ref::<web_sys::HashChangeEvent>() {
                Some(change) => fragment_of(&change.new_url()).to_owned(),
                None => location.fragment(),
            };
            if location.take_echo(&fragment) {
                return;
            }
            let app = on_hash.clone();
            spawn_local(async move {
                app.on_location_change().await;
            });
        })?;

        let on_click = app.clone();
        listen(&document, "click", move |event| {
            let Some(action) = click_action(&event) else {
                return;
            };
            event.prevent_default();
            let app = on_click.clone();
            spawn_local(async move {
                app.dispatch(&action).await;
            });
        })?;

        let on_submit = app.clone();
        listen(&document, "submit", move |event| {
            let Some(action) = submit_action(&event) else {
                return;
            };
            event.prevent_default();
            let app = on_submit.clone();
            spawn_local(async move {
                app.dispatch(&action).await;
            });
        })?;

        spawn_local(async move {
            app.start().await;
        });
        Ok(())
    }
}
