//! Known X11 / EWMH atoms used internally by penrose
//!
//! Atoms are interned strings understood by the X server. Rather than passing
//! raw strings around (and re-interning the same handful of names on every
//! call) penrose works with this closed enum and converts to/from the atom's
//! name with [AsRef<str>][AsRef] and [FromStr][std::str::FromStr].
use crate::{Error, Result};
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString};

/// A known X atom.
///
/// This covers the ICCCM and EWMH atoms that penrose makes use of internally.
/// Arbitrary atom names can still be interned directly using
/// [XConn::intern_atom][super::XConn::intern_atom] if you need to work with
/// something outside of this set.
#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Atom {
    /// MANAGER
    #[strum(serialize = "MANAGER")]
    Manager,
    /// WM_CLASS
    #[strum(serialize = "WM_CLASS")]
    WmClass,
    /// WM_DELETE_WINDOW
    #[strum(serialize = "WM_DELETE_WINDOW")]
    WmDeleteWindow,
    /// WM_HINTS
    #[strum(serialize = "WM_HINTS")]
    WmHints,
    /// WM_NAME
    #[strum(serialize = "WM_NAME")]
    WmName,
    /// WM_NORMAL_HINTS
    #[strum(serialize = "WM_NORMAL_HINTS")]
    WmNormalHints,
    /// WM_PROTOCOLS
    #[strum(serialize = "WM_PROTOCOLS")]
    WmProtocols,
    /// WM_STATE
    #[strum(serialize = "WM_STATE")]
    WmState,
    /// WM_TAKE_FOCUS
    #[strum(serialize = "WM_TAKE_FOCUS")]
    WmTakeFocus,
    /// WM_TRANSIENT_FOR
    #[strum(serialize = "WM_TRANSIENT_FOR")]
    WmTransientFor,

    /// _NET_ACTIVE_WINDOW
    #[strum(serialize = "_NET_ACTIVE_WINDOW")]
    NetActiveWindow,
    /// _NET_CLIENT_LIST
    #[strum(serialize = "_NET_CLIENT_LIST")]
    NetClientList,
    /// _NET_CLIENT_LIST_STACKING
    #[strum(serialize = "_NET_CLIENT_LIST_STACKING")]
    NetClientListStacking,
    /// _NET_CURRENT_DESKTOP
    #[strum(serialize = "_NET_CURRENT_DESKTOP")]
    NetCurrentDesktop,
    /// _NET_DESKTOP_NAMES
    #[strum(serialize = "_NET_DESKTOP_NAMES")]
    NetDesktopNames,
    /// _NET_DESKTOP_VIEWPORT
    #[strum(serialize = "_NET_DESKTOP_VIEWPORT")]
    NetDesktopViewport,
    /// _NET_NUMBER_OF_DESKTOPS
    #[strum(serialize = "_NET_NUMBER_OF_DESKTOPS")]
    NetNumberOfDesktops,
    /// _NET_SUPPORTED
    #[strum(serialize = "_NET_SUPPORTED")]
    NetSupported,
    /// _NET_SUPPORTING_WM_CHECK
    #[strum(serialize = "_NET_SUPPORTING_WM_CHECK")]
    NetSupportingWmCheck,
    /// _NET_SYSTEM_TRAY_OPCODE
    #[strum(serialize = "_NET_SYSTEM_TRAY_OPCODE")]
    NetSystemTrayOpcode,
    /// _NET_SYSTEM_TRAY_ORIENTATION_HORZ
    #[strum(serialize = "_NET_SYSTEM_TRAY_ORIENTATION_HORZ")]
    NetSystemTrayOrientationHorz,
    /// _NET_SYSTEM_TRAY_S0
    #[strum(serialize = "_NET_SYSTEM_TRAY_S0")]
    NetSystemTrayS0,
    /// _NET_WM_DESKTOP
    #[strum(serialize = "_NET_WM_DESKTOP")]
    NetWmDesktop,
    /// _NET_WM_NAME
    #[strum(serialize = "_NET_WM_NAME")]
    NetWmName,
    /// _NET_WM_STATE
    #[strum(serialize = "_NET_WM_STATE")]
    NetWmState,
    /// _NET_WM_STATE_DEMANDS_ATTENTION
    #[strum(serialize = "_NET_WM_STATE_DEMANDS_ATTENTION")]
    NetWmStateDemandsAttention,
    /// _NET_WM_STATE_FULLSCREEN
    #[strum(serialize = "_NET_WM_STATE_FULLSCREEN")]
    NetWmStateFullscreen,
    /// _NET_WM_STATE_HIDDEN
    #[strum(serialize = "_NET_WM_STATE_HIDDEN")]
    NetWmStateHidden,
    /// _NET_WM_STRUT
    #[strum(serialize = "_NET_WM_STRUT")]
    NetWmStrut,
    /// _NET_WM_WINDOW_TYPE
    #[strum(serialize = "_NET_WM_WINDOW_TYPE")]
    NetWmWindowType,
    /// _NET_WM_WINDOW_TYPE_COMBO
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_COMBO")]
    NetWindowTypeCombo,
    /// _NET_WM_WINDOW_TYPE_DESKTOP
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DESKTOP")]
    NetWindowTypeDesktop,
    /// _NET_WM_WINDOW_TYPE_DIALOG
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DIALOG")]
    NetWindowTypeDialog,
    /// _NET_WM_WINDOW_TYPE_DOCK
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DOCK")]
    NetWindowTypeDock,
    /// _NET_WM_WINDOW_TYPE_DROPDOWN_MENU
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DROPDOWN_MENU")]
    NetWindowTypeDropdownMenu,
    /// _NET_WM_WINDOW_TYPE_MENU
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_MENU")]
    NetWindowTypeMenu,
    /// _NET_WM_WINDOW_TYPE_NOTIFICATION
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_NOTIFICATION")]
    NetWindowTypeNotification,
    /// _NET_WM_WINDOW_TYPE_POPUP_MENU
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_POPUP_MENU")]
    NetWindowTypePopupMenu,
    /// _NET_WM_WINDOW_TYPE_SPLASH
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_SPLASH")]
    NetWindowTypeSplash,
    /// _NET_WM_WINDOW_TYPE_TOOLBAR
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_TOOLBAR")]
    NetWindowTypeToolbar,
    /// _NET_WM_WINDOW_TYPE_UTILITY
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_UTILITY")]
    NetWindowTypeUtility,

    /// _XEMBED
    #[strum(serialize = "_XEMBED")]
    XEmbed,
}

impl Atom {
    /// Intern every atom variant known to penrose, returning the raw name for
    /// each. Used by backends that want to eagerly intern the full atom set
    /// at startup rather than paying the round trip cost lazily per atom.
    pub fn names() -> impl Iterator<Item = &'static str> {
        use strum::IntoEnumIterator;

        Atom::iter().map(|a| a.as_ref())
    }

    /// Look up a known [Atom] from its raw X11 name, erroring out if the name
    /// given is not one that penrose knows about.
    ///
    /// This shadows the [FromStr][std::str::FromStr] impl derived by strum so
    /// that callers get penrose's own [Error] type rather than
    /// `strum::ParseError`.
    pub fn from_str(s: &str) -> Result<Self> {
        <Atom as FromStr>::from_str(s).map_err(|_| Error::UnknownAtom(s.to_owned()))
    }
}

/// Window types that should always be auto floated rather than tiled.
pub(crate) const AUTO_FLOAT_WINDOW_TYPES: &[Atom] = &[
    Atom::NetWindowTypeCombo,
    Atom::NetWindowTypeDialog,
    Atom::NetWindowTypeDropdownMenu,
    Atom::NetWindowTypeMenu,
    Atom::NetWindowTypeNotification,
    Atom::NetWindowTypePopupMenu,
    Atom::NetWindowTypeSplash,
    Atom::NetWindowTypeToolbar,
    Atom::NetWindowTypeUtility,
];

/// Window types that should never be managed at all.
pub(crate) const UNMANAGED_WINDOW_TYPES: &[Atom] =
    &[Atom::NetWindowTypeDesktop, Atom::NetWindowTypeDock];

/// The full set of EWMH atoms that penrose advertises support for via
/// `_NET_SUPPORTED`.
pub(crate) const EWMH_SUPPORTED_ATOMS: &[Atom] = &[
    Atom::NetActiveWindow,
    Atom::NetClientList,
    Atom::NetClientListStacking,
    Atom::NetCurrentDesktop,
    Atom::NetDesktopNames,
    Atom::NetDesktopViewport,
    Atom::NetNumberOfDesktops,
    Atom::NetSupported,
    Atom::NetSupportingWmCheck,
    Atom::NetWmDesktop,
    Atom::NetWmName,
    Atom::NetWmState,
    Atom::NetWmStateDemandsAttention,
    Atom::NetWmStateFullscreen,
    Atom::NetWmStateHidden,
    Atom::NetWmWindowType,
];

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_atom_round_trips_through_its_name() {
        for atom in Atom::iter() {
            let name = atom.as_ref();
            let parsed: Atom = name.parse().expect("known atom name should parse");

            assert_eq!(parsed.as_ref(), name);
        }
    }

    #[test]
    fn unknown_atom_name_is_an_error() {
        let res = Atom::from_str("NOT_A_REAL_ATOM");

        assert!(matches!(res, Err(Error::UnknownAtom(_))));
    }
}
