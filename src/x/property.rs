//! Data types for working with X window properties
use crate::{pure::geometry::Rect, Error, Result, Xid};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Possible flags that can be set in a [WmHints] client property
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Default)]
    pub struct WmHintsFlags: u32 {
        /// Input hint is set
        const INPUT_HINT         = 0b0000000001;
        /// State hint is set
        const STATE_HINT         = 0b0000000010;
        /// Icon pixmap hint is set
        const ICON_PIXMAP_HINT   = 0b0000000100;
        /// Icon window hint is set
        const ICON_WINDOW_HINT   = 0b0000001000;
        /// Icon position hint is set
        const ICON_POSITION_HINT = 0b0000010000;
        /// Icon mask hint is set
        const ICON_MASK_HINT     = 0b0000100000;
        /// Window group hint is set
        const WINDOW_GROUP_HINT  = 0b0001000000;
        /// Urgency hint is set
        const URGENCY_HINT       = 0b0100000000;
    }
}

bitflags::bitflags! {
    /// Possible flags that can be set in a [WmNormalHints] client property
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Default)]
    pub struct WmNormalHintsFlags: u32 {
        /// User-specified x, y
        const U_POSITION    = 0b0000000001;
        /// User-specified width, height
        const U_SIZE        = 0b0000000010;
        /// Program-specified position
        const P_POSITION    = 0b0000000100;
        /// Program-specified size
        const P_SIZE        = 0b0000001000;
        /// Program-specified minimum size
        const P_MIN_SIZE    = 0b0000010000;
        /// Program-specified maximum size
        const P_MAX_SIZE    = 0b0000100000;
        /// Program-specified resize increments
        const P_RESIZE_INC  = 0b0001000000;
        /// Program-specified min and max aspect ratios
        const P_ASPECT      = 0b0010000000;
        /// Program-specified base size
        const P_BASE_SIZE   = 0b0100000000;
        /// Program-specified window gravity
        const P_WIN_GRAVITY = 0b1000000000;
    }
}

/// Known property types that should be returnable by [XConn][super::XConn]
/// impls when they check window properties.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Prop {
    /// One or more X Atoms, stored by name
    Atom(Vec<String>),
    /// Raw u32 data for when the prop type is non-standard
    Bytes(Vec<u32>),
    /// One or more cardinal numbers
    Cardinal(Vec<u32>),
    /// UTF-8 encoded string data
    UTF8String(Vec<String>),
    /// One or more X window IDs
    Window(Vec<Xid>),
    /// The WM_HINTS property for this window
    WmHints(WmHints),
    /// The WM_NORMAL_HINTS property for this window
    WmNormalHints(WmNormalHints),
}

/// Possible valid values for setting the `WM_STATE` property on a client.
///
/// See the [ICCCM docs][1] for more information.
///
/// [1]: https://tronche.com/gui/x/icccm/sec-4.html#s-4.1.3.1
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum WmState {
    /// Window is not visible
    Withdrawn,
    /// Window is visible
    Normal,
    /// Window is iconified
    Iconic,
}

impl WmState {
    /// The raw ICCCM integer value for this state
    pub fn as_u32(&self) -> u32 {
        match self {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }

    /// Parse a [WmState] from its raw ICCCM integer value
    pub fn try_from_u32(val: u32) -> Result<Self> {
        match val {
            0 => Ok(WmState::Withdrawn),
            1 => Ok(WmState::Normal),
            3 => Ok(WmState::Iconic),
            _ => Err(Error::InvalidHints(format!("{val} is not a valid WM_STATE value"))),
        }
    }
}

/// The raw attributes of a window as returned by the X server.
///
/// This is a simplified view over the full set of attributes exposed by the
/// X11 protocol: penrose only makes decisions based on the fields below.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowAttributes {
    /// Does this window bypass the window manager entirely?
    pub override_redirect: bool,
    /// Is the window currently mapped?
    pub map_state: MapState,
    /// The input class for this window
    pub window_class: WindowClass,
}

impl WindowAttributes {
    /// Construct a new [WindowAttributes] from component parts
    pub fn new(override_redirect: bool, map_state: MapState, window_class: WindowClass) -> Self {
        Self {
            override_redirect,
            map_state,
            window_class,
        }
    }
}

/// The mapping states a window can be in
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MapState {
    /// The window is unmapped
    #[default]
    Unmapped,
    /// The window is never viewable
    UnViewable,
    /// The window is currently viewable
    Viewable,
}

/// The input class for a window
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindowClass {
    /// Class is copied from parent window
    #[default]
    CopyFromParent,
    /// Window can be displayed
    InputOutput,
    /// Window can only be used for queries
    InputOnly,
}

/// Client requested hints about information other than window geometry.
///
/// See the ICCCM [spec][1] for further details.
///
/// [1]: https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#wm_hints_property
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct WmHints {
    pub(crate) flags: WmHintsFlags,
    pub(crate) accepts_input: bool,
    pub(crate) initial_state: WmState,
    pub(crate) icon_pixmap: u32,
    pub(crate) icon_win: Xid,
    pub(crate) icon_position: (u32, u32),
    pub(crate) icon_mask: u32,
    pub(crate) window_group: u32,
}

impl WmHints {
    /// Create a new instance from component parts
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        flags: WmHintsFlags,
        accepts_input: bool,
        initial_state: WmState,
        icon_pixmap: u32,
        icon_win: Xid,
        icon_position: (u32, u32),
        icon_mask: u32,
        window_group: u32,
    ) -> Self {
        Self {
            flags,
            accepts_input,
            initial_state,
            icon_pixmap,
            icon_win,
            icon_position,
            icon_mask,
            window_group,
        }
    }

    /// Does this client want the window manager to handle giving it input focus?
    pub fn accepts_input(&self) -> bool {
        self.accepts_input
    }

    /// Try to construct a [WmHints] instance from raw bytes.
    ///
    /// This method expects a slice of 9 u32s corresponding to the C struct layout shown below.
    ///
    /// ```C
    /// typedef struct {
    ///     long flags;          /* marks which fields in this structure are defined */
    ///     Bool input;          /* does this application rely on the window manager to
    ///                             get keyboard input? */
    ///     int initial_state;   /* see below */
    ///     Pixmap icon_pixmap;  /* pixmap to be used as icon */
    ///     Window icon_window;  /* window to be used as icon */
    ///     int icon_x, icon_y;  /* initial position of icon */
    ///     Pixmap icon_mask;    /* pixmap to be used as mask for icon_pixmap */
    ///     XID window_group;    /* id of related window group */
    ///     /* this structure may be extended in the future */
    /// } XWMHints;
    /// ```
    pub fn try_from_bytes(raw: &[u32]) -> Result<Self> {
        if raw.len() != 9 {
            return Err(Error::InvalidHints(format!(
                "raw bytes should be [u32; 9] for WmHints, got [u32; {}]",
                raw.len()
            )));
        }

        let flags = WmHintsFlags::from_bits(raw[0]).unwrap_or_default();
        let accepts_input = !flags.contains(WmHintsFlags::INPUT_HINT) || raw[1] > 0;
        let initial_state = match (flags.contains(WmHintsFlags::STATE_HINT), raw[2]) {
            (true, 0) => WmState::Withdrawn,
            (true, 1) | (false, _) => WmState::Normal,
            (true, 2) => WmState::Iconic,
            _ => {
                return Err(Error::InvalidHints(format!(
                    "initial state flag should be 0, 1, 2: got {}",
                    raw[2]
                )))
            }
        };

        Ok(Self {
            flags,
            accepts_input,
            initial_state,
            icon_pixmap: raw[3],
            icon_win: Xid(raw[4]),
            icon_position: (raw[5], raw[6]),
            icon_mask: raw[7],
            window_group: raw[8],
        })
    }
}

/// Client requested hints about window geometry.
///
/// See the ICCCM [spec][1] for further details, but note that penrose does
/// not honour the following hints:
///   - gravity
///   - increment
///   - aspect ratio
///
/// [1]: https://www.x.org/releases/X11R7.6/doc/xorg-docs/specs/ICCCM/icccm.html#wm_normal_hints_property
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct WmNormalHints {
    pub(crate) flags: WmNormalHintsFlags,
    pub(crate) min: Option<(u32, u32)>,
    pub(crate) max: Option<(u32, u32)>,
    pub(crate) base: Option<(u32, u32)>,
    pub(crate) user_specified: Option<Rect>,
}

impl WmNormalHints {
    /// Create a new instance from component parts
    pub fn new(
        flags: WmNormalHintsFlags,
        min: Option<(u32, u32)>,
        max: Option<(u32, u32)>,
        base: Option<(u32, u32)>,
        user_specified: Option<Rect>,
    ) -> Self {
        Self {
            flags,
            min,
            max,
            base,
            user_specified,
        }
    }

    /// Try to construct a [WmNormalHints] instance from raw bytes.
    ///
    /// This method expects a slice of 18 u32s corresponding to the C struct
    /// layout of `XSizeHints`.
    pub fn try_from_bytes(raw: &[u32]) -> Result<Self> {
        if raw.len() != 18 {
            return Err(Error::InvalidHints(format!(
                "raw bytes should be [u32; 18] for WmNormalHints, got [u32; {}]",
                raw.len()
            )));
        }

        let flags = WmNormalHintsFlags::from_bits(raw[0]).unwrap_or_default();

        let user_specified =
            if flags.contains(WmNormalHintsFlags::U_POSITION) || flags.contains(WmNormalHintsFlags::U_SIZE) {
                Some(Rect::new(raw[1], raw[2], raw[3], raw[4]))
            } else {
                None
            };

        let min = flags
            .contains(WmNormalHintsFlags::P_MIN_SIZE)
            .then(|| (raw[5], raw[6]));
        let max = flags
            .contains(WmNormalHintsFlags::P_MAX_SIZE)
            .then(|| (raw[7], raw[8]));
        let base = flags
            .contains(WmNormalHintsFlags::P_BASE_SIZE)
            .then(|| (raw[15], raw[16]));

        Ok(Self {
            flags,
            min,
            max,
            base,
            user_specified,
        })
    }

    /// Clamp `r` so that it respects any minimum / maximum size hints carried
    /// by this property, leaving position untouched.
    pub fn apply_to(&self, r: Rect) -> Rect {
        let mut w = r.w;
        let mut h = r.h;

        if let Some((min_w, min_h)) = self.min {
            w = w.max(min_w);
            h = h.max(min_h);
        }

        if let Some((max_w, max_h)) = self.max {
            if max_w > 0 {
                w = w.min(max_w);
            }
            if max_h > 0 {
                h = h.min(max_h);
            }
        }

        Rect::new(r.x, r.y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wm_state_round_trips_through_its_raw_value() {
        for state in [WmState::Withdrawn, WmState::Normal, WmState::Iconic] {
            let raw = state.as_u32();
            assert_eq!(WmState::try_from_u32(raw).unwrap(), state);
        }
    }

    #[test]
    fn invalid_wm_state_value_is_an_error() {
        assert!(WmState::try_from_u32(2).is_err());
    }

    #[test]
    fn normal_hints_clamp_below_minimum_size() {
        let hints = WmNormalHints::new(WmNormalHintsFlags::P_MIN_SIZE, Some((200, 100)), None, None, None);
        let r = hints.apply_to(Rect::new(0, 0, 50, 50));

        assert_eq!(r, Rect::new(0, 0, 200, 100));
    }

    #[test]
    fn normal_hints_clamp_above_maximum_size() {
        let hints = WmNormalHints::new(WmNormalHintsFlags::P_MAX_SIZE, None, Some((400, 300)), None, None);
        let r = hints.apply_to(Rect::new(0, 0, 800, 600));

        assert_eq!(r, Rect::new(0, 0, 400, 300));
    }

    #[test]
    fn normal_hints_with_no_flags_leave_geometry_untouched() {
        let hints = WmNormalHints::new(WmNormalHintsFlags::empty(), None, None, None, None);
        let r = Rect::new(10, 10, 123, 456);

        assert_eq!(hints.apply_to(r), r);
    }
}
