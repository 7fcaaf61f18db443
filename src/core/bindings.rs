//! Setting up and responding to user defined key / mouse bindings
use crate::{core::State, x::XConn, Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::EnumIter;

/// User defined key bindings, keyed by the [KeyCode] that triggers them.
pub type KeyBindings<X> = HashMap<KeyCode, Box<dyn KeyEventHandler<X>>>;

/// User defined mouse bindings, keyed by the kind of mouse event and the button
/// / modifier state that should trigger them.
pub type MouseBindings<X> = HashMap<(MouseEventKind, MouseState), Box<dyn MouseEventHandler<X>>>;

/// Some action to be run in response to a user key binding.
pub trait KeyEventHandler<X>
where
    X: XConn,
{
    /// Run this handler.
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()>;
}

impl<X, F> KeyEventHandler<X> for F
where
    X: XConn,
    F: FnMut(&mut State<X>, &X) -> Result<()>,
{
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        (self)(state, x)
    }
}

/// An action to be run in response to a user mouse binding.
pub trait MouseEventHandler<X>
where
    X: XConn,
{
    /// Run this handler.
    fn call(&mut self, event: &MouseEvent, state: &mut State<X>, x: &X) -> Result<()>;
}

impl<X, F> MouseEventHandler<X> for F
where
    X: XConn,
    F: FnMut(&mut State<X>, &X) -> Result<()>,
{
    fn call(&mut self, _event: &MouseEvent, state: &mut State<X>, x: &X) -> Result<()> {
        (self)(state, x)
    }
}

/// A u16 X key-code bitmask for held modifiers
pub type KeyCodeMask = u16;

/// A u8 X key-code enum value
pub type KeyCodeValue = u8;

/// A key press and held modifiers, identified by their raw X11 key code rather
/// than any particular key symbol mapping.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyCode {
    /// The held modifier mask
    pub mask: KeyCodeMask,
    /// The key code that was held
    pub code: KeyCodeValue,
}

impl KeyCode {
    /// Create a new [KeyCode] from this one that removes the given mask
    pub fn ignoring_modifier(&self, mask: KeyCodeMask) -> KeyCode {
        KeyCode {
            mask: self.mask & !mask,
            code: self.code,
        }
    }
}

/// Known mouse buttons for binding actions
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MouseButton {
    /// 1
    Left,
    /// 2
    Middle,
    /// 3
    Right,
    /// 4
    ScrollUp,
    /// 5
    ScrollDown,
}

impl From<MouseButton> for u8 {
    fn from(b: MouseButton) -> u8 {
        match b {
            MouseButton::Left => 1,
            MouseButton::Middle => 2,
            MouseButton::Right => 3,
            MouseButton::ScrollUp => 4,
            MouseButton::ScrollDown => 5,
        }
    }
}

/// Known modifier keys for bindings
#[derive(Debug, EnumIter, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ModifierKey {
    /// Control
    Ctrl,
    /// Alt
    Alt,
    /// Shift
    Shift,
    /// Meta / super / windows
    Meta,
}

impl TryFrom<&str> for ModifierKey {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        match s {
            "C" => Ok(Self::Ctrl),
            "A" => Ok(Self::Alt),
            "S" => Ok(Self::Shift),
            "M" => Ok(Self::Meta),
            _ => Err(Error::UnknownModifier(s.to_string())),
        }
    }
}

/// A mouse button and the modifiers that were held alongside it.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MouseState {
    /// The [MouseButton] being held
    pub button: MouseButton,
    /// All [ModifierKey]s being held
    pub modifiers: Vec<ModifierKey>,
}

impl MouseState {
    /// Construct a new [MouseState].
    ///
    /// `modifiers` are sorted on construction so that two states built from the
    /// same set of modifiers in a different order still compare as equal.
    pub fn new(button: MouseButton, mut modifiers: Vec<ModifierKey>) -> Self {
        modifiers.sort();
        Self { button, modifiers }
    }
}

/// The types of mouse events represented by a [MouseEvent]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MouseEventKind {
    /// A button was pressed
    Press,
    /// A button was released
    Release,
    /// The mouse was moved while a button was held
    Motion,
}

/// A mouse movement or button event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MouseEvent {
    /// The ID of the window that contained the click
    pub id: crate::core::Xid,
    /// Absolute coordinate of the event
    pub rpt: crate::pure::geometry::Point,
    /// Coordinate of the event relative to the top-left of the window itself
    pub wpt: crate::pure::geometry::Point,
    /// The modifier and button state that was held
    pub state: MouseState,
    /// Was this a press, release or motion event?
    pub kind: MouseEventKind,
}

impl MouseEvent {
    /// Construct a new [MouseEvent] from raw data
    pub fn new(
        id: crate::core::Xid,
        rx: i16,
        ry: i16,
        ex: i16,
        ey: i16,
        state: MouseState,
        kind: MouseEventKind,
    ) -> Self {
        use crate::pure::geometry::Point;

        MouseEvent {
            id,
            rpt: Point::new(rx as u32, ry as u32),
            wpt: Point::new(ex as u32, ey as u32),
            state,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_state_equality_is_independent_of_modifier_order() {
        let a = MouseState::new(MouseButton::Left, vec![ModifierKey::Ctrl, ModifierKey::Shift]);
        let b = MouseState::new(MouseButton::Left, vec![ModifierKey::Shift, ModifierKey::Ctrl]);

        assert_eq!(a, b);
    }

    #[test]
    fn ignoring_modifier_clears_only_the_given_bits() {
        let k = KeyCode { mask: 0b1111, code: 42 };
        let ignored = k.ignoring_modifier(0b0011);

        assert_eq!(ignored.mask, 0b1100);
        assert_eq!(ignored.code, 42);
    }
}
