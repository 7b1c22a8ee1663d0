//! Networking modules for the HR backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` holds the typed client and the `Transport` seam, `http` the
//! browser transport, and `types` the shared wire schema.

pub mod api;
#[cfg(feature = "hydrate")]
pub mod http;
pub mod types;
