//! Fakes shared by unit tests across modules.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use async_trait::async_trait;

use crate::app::AppContext;
use crate::config::AppConfig;
use crate::net::api::{ApiClient, ApiError, ApiRequest, Method, RawResponse, Transport};
use crate::net::types::User;
use crate::router::RouteContext;
use crate::state::session::Session;
use crate::state::storage::{MemoryStorage, SessionStore};
use crate::view::MemoryScreen;

pub const BASE_URL: &str = "http://api.test";

/// Transport answering from a table keyed by method and path (query
/// stripped). Unknown routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: RefCell<HashMap<(Method, String), Result<RawResponse, ApiError>>>,
    log: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.respond_raw(method, path, status, &body.to_string());
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.routes.borrow_mut().insert(
            (method, path.to_owned()),
            Ok(RawResponse {
                status,
                body: body.to_owned(),
            }),
        );
    }

    pub fn fail(&self, method: Method, path: &str, error: ApiError) {
        self.routes
            .borrow_mut()
            .insert((method, path.to_owned()), Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log.borrow().len()
    }

    /// Requests whose path (query stripped) equals `path`.
    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.log
            .borrow()
            .iter()
            .filter(|r| path_of(&r.url) == path)
            .cloned()
            .collect()
    }
}

fn path_of(url: &str) -> &str {
    let rest = url.strip_prefix(BASE_URL).unwrap_or(url);
    rest.split('?').next().unwrap_or(rest)
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let key = (request.method, path_of(&request.url).to_owned());
        self.log.borrow_mut().push(request);
        self.routes.borrow().get(&key).cloned().unwrap_or_else(|| {
            Ok(RawResponse {
                status: 404,
                body: r#"{"message":"Not Found"}"#.to_owned(),
            })
        })
    }
}

/// Application services wired to in-memory storage, a scripted transport
/// and a recording screen.
pub struct Harness {
    pub storage: Rc<MemoryStorage>,
    pub transport: Rc<ScriptedTransport>,
    pub screen: Rc<MemoryScreen>,
    pub app: AppContext,
    pub store: Rc<SessionStore>,
    pub api: Rc<ApiClient>,
    pub session: Rc<Session>,
}

impl Harness {
    pub fn new() -> Self {
        let storage = Rc::new(MemoryStorage::new());
        let transport = Rc::new(ScriptedTransport::new());
        let screen = Rc::new(MemoryScreen::new("HR System"));
        let app = AppContext::new(
            AppConfig::with_api_base(BASE_URL),
            storage.clone(),
            transport.clone(),
            screen.clone(),
        );
        Self {
            storage,
            transport,
            screen,
            store: app.store.clone(),
            api: app.api.clone(),
            session: app.session.clone(),
            app,
        }
    }

    /// Store a session for a user with `profile` as if a login had succeeded.
    pub fn sign_in(&self, profile: &str) -> User {
        let user = user_with_profile(profile);
        self.store.set_token("test-token").unwrap();
        self.store.set_user(&user).unwrap();
        user
    }
}

pub fn user_with_profile(profile: &str) -> User {
    User {
        id_user: "u-1".to_owned(),
        nama_lengkap: "Budi Santoso".to_owned(),
        email: "budi@hr.id".to_owned(),
        profile: profile.to_owned(),
        ..User::default()
    }
}

pub fn route_context(route: &str, params: &[(&str, &str)], query: &[(&str, &str)]) -> RouteContext {
    let pairs = |items: &[(&str, &str)]| -> BTreeMap<String, String> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    };
    RouteContext {
        params: pairs(params),
        query: pairs(query),
        route: route.to_owned(),
    }
}
