//! Pre-defined actions for use in user defined key bindings
//!
//! This module re-exports the generic handler constructors from
//! [`core::actions`][crate::core::actions] and adds the higher level
//! actions built out of box for managing floating windows.
pub use crate::core::actions::*;

pub mod floating;
