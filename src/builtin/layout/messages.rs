//! Re-exports of the message types defined in [`core::layout::messages`][crate::core::layout::messages]
//!
//! The built in layouts in this module only ever need the common and control
//! messages, so they are flattened here for convenience.
pub use crate::core::layout::messages::{common::*, control::*};
