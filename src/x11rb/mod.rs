//! An [XConn][crate::x::XConn] implementation backed by a direct connection
//! to the X server via the `x11rb` crate.
mod conn;

pub use conn::Conn;
