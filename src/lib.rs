//! A tiling window manager library inspired by dwm and xmonad
//!
//! Penrose is written as a library for building your own window manager: the
//! [core] module provides the main event loop, user facing [State] and
//! [Config][core::Config] types and the traits used to extend them, [pure]
//! implements the side effect free window management logic that everything
//! else is built on top of, [x] is the interface penrose uses to talk to the
//! X server and [builtin] / [extensions] provide batteries-included layouts,
//! hooks and actions for assembling your own config out of.
#![warn(missing_docs)]

#[macro_use]
pub mod macros;

pub mod builtin;
pub mod color;
pub mod core;
pub mod extensions;
pub mod pure;
pub mod util;
pub mod x;

#[cfg(feature = "x11rb")]
pub mod x11rb;

mod error;

pub use crate::core::{State, Xid};
pub use color::Color;
pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    #[test]
    fn it_works() {
        assert_eq!(2 + 2, 4);
    }
}
