//! Optional, opt-in functionality built on top of the core and builtin APIs.
//!
//! Everything in this module is implemented purely in terms of the public
//! hooks, actions and bindings APIs exposed by [crate::core]: nothing here
//! requires special access to penrose internals, so it also serves as a
//! worked example of how to extend penrose yourself.
pub mod actions;
pub mod hooks;
pub mod layout;
pub mod util;
