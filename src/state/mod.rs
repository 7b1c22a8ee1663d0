//! Client-side state services.
//!
//! SYSTEM CONTEXT
//! ==============
//! `storage` persists the session records, `session` is the auth gate the
//! navigator consults, and `notify` queues toast notifications. Each is
//! constructed once in `AppContext` and shared by `Rc`.

pub mod notify;
pub mod session;
pub mod storage;
