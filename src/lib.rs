//! Browser client for the HR attendance system.
//!
//! SYSTEM CONTEXT
//! ==============
//! A single-page application driven by the location fragment. `router`
//! resolves `#/...` paths behind the session gate, `pages` load and render
//! each screen, `net` talks to the HR backend, and `state` holds the
//! session and notifications. `app` ties them together.
//!
//! Browser bindings live behind the `hydrate` feature; without it the crate
//! runs against in-memory storage, location and screen.

pub mod app;
pub mod config;
pub mod net;
pub mod pages;
pub mod router;
pub mod state;
pub mod util;
pub mod view;

#[cfg(test)]
mod test_support;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    use std::rc::Rc;

    use crate::app::{App, AppContext, browser};
    use crate::config::AppConfig;
    use crate::net::http::FetchTransport;
    use crate::router::location::BrowserLocation;
    use crate::state::storage::WebStorage;
    use crate::view::BrowserScreen;

    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Debug);

    let config = AppConfig::from_build_env();
    let screen = Rc::new(BrowserScreen::new(&config.app_name));
    let transport = Rc::new(FetchTransport::new(config.api_timeout));
    let location = Rc::new(BrowserLocation::new());
    let context = AppContext::new(config, Rc::new(WebStorage::new()), transport, screen.clone());
    let app = Rc::new(App::new(context, location.clone(), screen));
    browser::install(app, location)
}
