//! Hash-fragment routing.
//!
//! SYSTEM CONTEXT
//! ==============
//! `table` maps fragment patterns to page kinds and access policy, `query`
//! codes the `?key=value` suffix, `location` abstracts the fragment and its
//! history, and `navigator` ties them to the session gate and the page host.

pub mod location;
pub mod navigator;
pub mod query;
pub mod table;

pub use navigator::{CurrentRoute, Navigation, Navigator, PageHost, RouteContext};
pub use table::{Route, RouteOptions, RouteTable};
