//! A direct X server connection using the x11rb crate.
use crate::{
    core::bindings::{KeyCode, ModifierKey, MouseButton, MouseEvent, MouseEventKind, MouseState},
    pure::geometry::{Point, Rect},
    x::{
        atom::Atom,
        event::{ClientEventMask, ClientMessage, ClientMessageData, ConfigureEvent, ExposeEvent, PointerChange, PropertyEvent},
        property::{MapState, Prop, WindowAttributes, WindowClass, WmHints, WmNormalHints, WmState},
        ClientAttr, ClientConfig, XConn, XEvent,
    },
    Error, Result, Xid,
};
use std::{cell::RefCell, collections::HashMap};
use strum::IntoEnumIterator;
use tracing::{trace, warn};
use x11rb::{
    connection::Connection,
    protocol::{
        randr::{self, ConnectionExt as _},
        xproto::{
            ChangeWindowAttributesAux, ClientMessageEvent, ConfigureWindowAux, ConnectionExt as _,
            CreateWindowAux, EventMask, GrabMode, InputFocus, ModMask, PropMode, StackMode,
            WindowClass as XWindowClass, CLIENT_MESSAGE_EVENT,
        },
        Event,
    },
};

// NumLock and CapsLock conventionally live on Mod2 and Lock on every X server
// this has been run against: discovering them dynamically would mean walking
// the keyboard extension's modifier mapping, which is out of scope here.
const NUMLOCK: u16 = ModMask::M2.bits() as u16;
const CAPSLOCK: u16 = ModMask::LOCK.bits() as u16;

fn x_err(e: impl std::fmt::Display) -> Error {
    Error::X11rb(e.to_string())
}

fn modifier_mask(modifiers: &[ModifierKey]) -> u16 {
    modifiers.iter().fold(0u16, |acc, m| {
        acc | match m {
            ModifierKey::Ctrl => ModMask::CONTROL.bits() as u16,
            ModifierKey::Alt => ModMask::M1.bits() as u16,
            ModifierKey::Shift => ModMask::SHIFT.bits() as u16,
            ModifierKey::Meta => ModMask::M4.bits() as u16,
        }
    })
}

// Decode which button is implied by the ButtonNMask bits of a motion event's
// state field: this replaces the hardcoded `detail = 5` workaround from the
// legacy xconn implementation, which never actually identified the held
// button correctly.
fn button_held_in(state: u16) -> Option<MouseButton> {
    const MASKS: [(u16, MouseButton); 5] = [
        (1 << 8, MouseButton::Left),
        (1 << 9, MouseButton::Middle),
        (1 << 10, MouseButton::Right),
        (1 << 11, MouseButton::ScrollUp),
        (1 << 12, MouseButton::ScrollDown),
    ];

    MASKS.iter().find(|(mask, _)| state & mask != 0).map(|(_, b)| *b)
}

fn modifiers_held_in(state: u16) -> Vec<ModifierKey> {
    ModifierKey::iter().filter(|m| modifier_mask(&[*m]) & state != 0).collect()
}

fn mouse_state(detail: u8, raw_state: u16) -> Option<MouseState> {
    let button = match detail {
        1 => MouseButton::Left,
        2 => MouseButton::Middle,
        3 => MouseButton::Right,
        4 => MouseButton::ScrollUp,
        5 => MouseButton::ScrollDown,
        _ => return None,
    };

    Some(MouseState::new(button, modifiers_held_in(raw_state)))
}

/// An [XConn][crate::x::XConn] implementation that talks to a running X
/// server directly via the `x11rb` crate.
///
/// `C` is the underlying x11rb connection type: use [Conn::new] to connect
/// over the display named by `$DISPLAY` using x11rb's own
/// [RustConnection][x11rb::rust_connection::RustConnection], or
/// [Conn::new_for_connection] to supply a connection of your own.
pub struct Conn<C> {
    conn: C,
    root: Xid,
    check_win: Xid,
    atoms: RefCell<HashMap<String, Xid>>,
}

impl Conn<x11rb::rust_connection::RustConnection> {
    /// Establish a new connection to the X server named by `$DISPLAY`.
    pub fn new() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).map_err(x_err)?;
        Self::new_for_connection(conn, screen_num)
    }
}

impl<C> Conn<C>
where
    C: Connection,
{
    /// Wrap an already-established x11rb connection.
    pub fn new_for_connection(conn: C, screen_num: usize) -> Result<Self> {
        let root = conn.setup().roots[screen_num].root;

        if conn.extension_information(randr::X11_EXTENSION_NAME).map_err(x_err)?.is_none() {
            return Err(Error::X11rb("the X server does not support RandR".to_owned()));
        }

        let mask = randr::NotifyMask::OUTPUT_CHANGE | randr::NotifyMask::CRTC_CHANGE | randr::NotifyMask::SCREEN_CHANGE;
        conn.randr_select_input(root, mask).map_err(x_err)?.check().map_err(x_err)?;

        let check_win = conn.generate_id().map_err(x_err)?;
        let aux = CreateWindowAux::new().override_redirect(1);
        conn.create_window(0, check_win, root, 0, 0, 1, 1, 0, XWindowClass::INPUT_OUTPUT, 0, &aux)
            .map_err(x_err)?
            .check()
            .map_err(x_err)?;
        conn.flush().map_err(x_err)?;

        let this = Self {
            conn,
            root: Xid(root),
            check_win: Xid(check_win),
            atoms: RefCell::new(HashMap::new()),
        };

        for name in Atom::names() {
            this.intern_atom(name)?;
        }

        Ok(this)
    }

    /// The stub, never-mapped window created on startup so that EWMH clients
    /// have something to point `_NET_SUPPORTING_WM_CHECK` at.
    pub fn check_window(&self) -> Xid {
        self.check_win
    }

    fn utf8_string_atom(&self) -> Result<Xid> {
        self.intern_atom("UTF8_STRING")
    }

    fn wm_state_atom(&self) -> Result<Xid> {
        self.intern_atom(Atom::WmState.as_ref())
    }

    fn convert_event(&self, event: Event) -> Result<Option<XEvent>> {
        let ev = match event {
            Event::ButtonPress(e) => mouse_state(e.detail, e.state.into())
                .map(|state| MouseEvent::new(Xid(e.event), e.root_x, e.root_y, e.event_x, e.event_y, state, MouseEventKind::Press))
                .map(XEvent::MouseEvent),

            Event::ButtonRelease(e) => mouse_state(e.detail, e.state.into())
                .map(|state| MouseEvent::new(Xid(e.event), e.root_x, e.root_y, e.event_x, e.event_y, state, MouseEventKind::Release))
                .map(XEvent::MouseEvent),

            Event::MotionNotify(e) => button_held_in(e.state.into()).map(|button| {
                let state = MouseState::new(button, modifiers_held_in(e.state.into()));
                XEvent::MouseEvent(MouseEvent::new(Xid(e.event), e.root_x, e.root_y, e.event_x, e.event_y, state, MouseEventKind::Motion))
            }),

            Event::KeyPress(e) => {
                let code = KeyCode { mask: e.state.into(), code: e.detail }.ignoring_modifier(NUMLOCK | CAPSLOCK);
                Some(XEvent::KeyPress(code))
            }

            Event::MapRequest(e) => Some(XEvent::MapRequest(Xid(e.window))),
            Event::FocusIn(e) => Some(XEvent::FocusIn(Xid(e.event))),
            Event::DestroyNotify(e) => Some(XEvent::Destroy(Xid(e.window))),
            Event::UnmapNotify(e) => Some(XEvent::UnmapNotify(Xid(e.window))),
            Event::MappingNotify(_) => Some(XEvent::MappingNotify),

            Event::EnterNotify(e) => Some(XEvent::Enter(PointerChange {
                id: Xid(e.event),
                abs: Point::new(e.root_x as u32, e.root_y as u32),
                relative: Point::new(e.event_x as u32, e.event_y as u32),
                same_screen: e.same_screen_focus & 0x01 != 0,
            })),

            Event::LeaveNotify(e) => Some(XEvent::Leave(PointerChange {
                id: Xid(e.event),
                abs: Point::new(e.root_x as u32, e.root_y as u32),
                relative: Point::new(e.event_x as u32, e.event_y as u32),
                same_screen: e.same_screen_focus & 0x01 != 0,
            })),

            Event::ConfigureNotify(e) => Some(XEvent::ConfigureNotify(ConfigureEvent {
                id: Xid(e.window),
                r: Rect::new(e.x as u32, e.y as u32, e.width as u32, e.height as u32),
                is_root: e.window == *self.root,
            })),

            Event::ConfigureRequest(e) => Some(XEvent::ConfigureRequest(ConfigureEvent {
                id: Xid(e.window),
                r: Rect::new(e.x as u32, e.y as u32, e.width as u32, e.height as u32),
                is_root: e.window == *self.root,
            })),

            Event::Expose(e) => Some(XEvent::Expose(ExposeEvent {
                id: Xid(e.window),
                r: Rect::new(e.x as u32, e.y as u32, e.width as u32, e.height as u32),
                count: e.count as usize,
            })),

            Event::PropertyNotify(e) => {
                let atom = self.atom_name(Xid(e.atom))?;
                Some(XEvent::PropertyNotify(PropertyEvent { id: Xid(e.window), atom, is_root: e.window == *self.root }))
            }

            Event::ClientMessage(e) => {
                let dtype = self.atom_name(Xid(e.type_))?;
                let data = match e.format {
                    8 => ClientMessageData::U8(e.data.as_data8()),
                    16 => ClientMessageData::U16(e.data.as_data16()),
                    _ => ClientMessageData::U32(e.data.as_data32()),
                };
                Some(XEvent::ClientMessage(ClientMessage::new(Xid(e.window), ClientEventMask::NoEventMask, dtype, data)))
            }

            Event::RandrScreenChangeNotify(_) => Some(XEvent::ScreenChange),
            Event::RandrNotify(_) => Some(XEvent::RandrNotify),

            _ => {
                trace!("dropping unhandled x11 event");
                None
            }
        };

        Ok(ev)
    }
}

impl<C> XConn for Conn<C>
where
    C: Connection,
{
    fn root(&self) -> Xid {
        self.root
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        let resources = self.conn.randr_get_screen_resources(*self.root).map_err(x_err)?.reply().map_err(x_err)?;

        let cookies: Vec<_> = resources
            .crtcs
            .iter()
            .map(|&c| self.conn.randr_get_crtc_info(c, 0).map_err(x_err))
            .collect::<Result<Vec<_>>>()?;

        let rects = cookies
            .into_iter()
            .flat_map(|cookie| cookie.reply().ok())
            .filter(|reply| reply.width > 0 && reply.height > 0)
            .map(|reply| Rect::new(reply.x as u32, reply.y as u32, reply.width as u32, reply.height as u32))
            .collect();

        Ok(rects)
    }

    fn cursor_position(&self) -> Result<Point> {
        let reply = self.conn.query_pointer(*self.root).map_err(x_err)?.reply().map_err(x_err)?;

        Ok(Point::new(reply.root_x as u32, reply.root_y as u32))
    }

    fn grab(&self, key_codes: &[KeyCode], mouse_states: &[MouseState]) -> Result<()> {
        // install one grab per combination of {0, numlock} x {0, capslock} x the
        // requested mask so that the binding still fires with either lock held
        let lock_combos = [0u16, NUMLOCK, CAPSLOCK, NUMLOCK | CAPSLOCK];

        for key in key_codes {
            for lock in lock_combos {
                self.conn
                    .grab_key(false, *self.root, key.mask | lock, key.code, GrabMode::ASYNC, GrabMode::ASYNC)
                    .map_err(x_err)?
                    .check()
                    .map_err(x_err)?;
            }
        }

        let button_mask = EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::BUTTON_MOTION;
        for state in mouse_states {
            let base_mask = modifier_mask(&state.modifiers);
            for lock in lock_combos {
                self.conn
                    .grab_button(
                        false,
                        *self.root,
                        button_mask,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                        x11rb::NONE,
                        x11rb::NONE,
                        u8::from(state.button),
                        base_mask | lock,
                    )
                    .map_err(x_err)?
                    .check()
                    .map_err(x_err)?;
            }
        }

        self.conn.flush().map_err(x_err)
    }

    fn next_event(&self) -> Result<XEvent> {
        loop {
            let event = self.conn.wait_for_event().map_err(x_err)?;
            if let Some(e) = self.convert_event(event)? {
                return Ok(e);
            }
        }
    }

    fn flush(&self) {
        if let Err(e) = self.conn.flush() {
            warn!(%e, "failed to flush x11 connection");
        }
    }

    fn intern_atom(&self, atom: &str) -> Result<Xid> {
        if let Some(&xid) = self.atoms.borrow().get(atom) {
            return Ok(xid);
        }

        let xid = Xid(self.conn.intern_atom(false, atom.as_bytes()).map_err(x_err)?.reply().map_err(x_err)?.atom);
        self.atoms.borrow_mut().insert(atom.to_owned(), xid);

        Ok(xid)
    }

    fn atom_name(&self, xid: Xid) -> Result<String> {
        if let Some(name) = self.atoms.borrow().iter().find(|(_, &v)| v == xid).map(|(k, _)| k.clone()) {
            return Ok(name);
        }

        let reply = self.conn.get_atom_name(*xid).map_err(x_err)?.reply().map_err(x_err)?;
        let name = String::from_utf8(reply.name).map_err(|e| Error::X11rb(e.to_string()))?;
        self.atoms.borrow_mut().insert(name.clone(), xid);

        Ok(name)
    }

    fn client_geometry(&self, client: Xid) -> Result<Rect> {
        let geo = self.conn.get_geometry(*client).map_err(x_err)?.reply().map_err(x_err)?;

        Ok(Rect::new(geo.x as u32, geo.y as u32, geo.width as u32, geo.height as u32))
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        let reply = self.conn.query_tree(*self.root).map_err(x_err)?.reply().map_err(x_err)?;

        Ok(reply.children.into_iter().map(Xid).collect())
    }

    fn map(&self, client: Xid) -> Result<()> {
        self.conn.map_window(*client).map_err(x_err)?.check().map_err(x_err)
    }

    fn unmap(&self, client: Xid) -> Result<()> {
        self.conn.unmap_window(*client).map_err(x_err)?.check().map_err(x_err)
    }

    fn kill(&self, client: Xid) -> Result<()> {
        self.conn.kill_client(*client).map_err(x_err)?.check().map_err(x_err)
    }

    fn focus(&self, client: Xid) -> Result<()> {
        self.conn.set_input_focus(InputFocus::PARENT, *client, x11rb::CURRENT_TIME).map_err(x_err)?.check().map_err(x_err)
    }

    fn get_prop(&self, client: Xid, prop_name: &str) -> Result<Option<Prop>> {
        let atom = self.intern_atom(prop_name)?;
        let reply = self
            .conn
            .get_property(false, *client, *atom, x11rb::protocol::xproto::AtomEnum::ANY, 0, 1024)
            .map_err(x_err)?
            .reply()
            .map_err(x_err)?;

        if reply.type_ == 0 {
            return Ok(None);
        }

        if prop_name == Atom::WmHints.as_ref() {
            let raw: Vec<u32> = reply.value32().map(|v| v.collect()).unwrap_or_default();
            return Ok(Some(Prop::WmHints(WmHints::try_from_bytes(&raw)?)));
        }
        if prop_name == Atom::WmNormalHints.as_ref() {
            let raw: Vec<u32> = reply.value32().map(|v| v.collect()).unwrap_or_default();
            return Ok(Some(Prop::WmNormalHints(WmNormalHints::try_from_bytes(&raw)?)));
        }

        let utf8_string = self.utf8_string_atom()?;
        let atom_ty = u32::from(x11rb::protocol::xproto::AtomEnum::ATOM);
        let cardinal_ty = u32::from(x11rb::protocol::xproto::AtomEnum::CARDINAL);
        let window_ty = u32::from(x11rb::protocol::xproto::AtomEnum::WINDOW);
        let string_ty = u32::from(x11rb::protocol::xproto::AtomEnum::STRING);

        let prop = if reply.type_ == atom_ty {
            let ids: Vec<u32> = reply.value32().map(|v| v.collect()).unwrap_or_default();
            let names = ids.into_iter().map(|a| self.atom_name(Xid(a))).collect::<Result<Vec<_>>>()?;
            Prop::Atom(names)
        } else if reply.type_ == cardinal_ty {
            Prop::Cardinal(reply.value32().map(|v| v.collect()).unwrap_or_default())
        } else if reply.type_ == window_ty {
            Prop::Window(reply.value32().map(|v| v.map(Xid).collect()).unwrap_or_default())
        } else if reply.type_ == string_ty || reply.type_ == *utf8_string {
            let raw = String::from_utf8_lossy(&reply.value).into_owned();
            let strs = raw.trim_end_matches('\0').split('\0').map(str::to_owned).collect();
            Prop::UTF8String(strs)
        } else {
            Prop::Bytes(reply.value32().map(|v| v.collect()).unwrap_or_default())
        };

        Ok(Some(prop))
    }

    fn list_props(&self, client: Xid) -> Result<Vec<String>> {
        let reply = self.conn.list_properties(*client).map_err(x_err)?.reply().map_err(x_err)?;

        reply.atoms.into_iter().map(|a| self.atom_name(Xid(a))).collect()
    }

    fn get_wm_state(&self, client: Xid) -> Result<Option<WmState>> {
        let atom = self.wm_state_atom()?;
        let reply = self.conn.get_property(false, *client, *atom, *atom, 0, 2).map_err(x_err)?.reply().map_err(x_err)?;

        match reply.value32().and_then(|mut v| v.next()) {
            Some(raw) => Ok(Some(WmState::try_from_u32(raw)?)),
            None => Ok(None),
        }
    }

    fn get_window_attributes(&self, client: Xid) -> Result<WindowAttributes> {
        let reply = self.conn.get_window_attributes(*client).map_err(x_err)?.reply().map_err(x_err)?;

        let map_state = match reply.map_state {
            x11rb::protocol::xproto::MapState::UNMAPPED => MapState::Unmapped,
            x11rb::protocol::xproto::MapState::UNVIEWABLE => MapState::UnViewable,
            _ => MapState::Viewable,
        };

        let window_class = match reply.class {
            x11rb::protocol::xproto::WindowClass::INPUT_ONLY => WindowClass::InputOnly,
            x11rb::protocol::xproto::WindowClass::INPUT_OUTPUT => WindowClass::InputOutput,
            _ => WindowClass::CopyFromParent,
        };

        Ok(WindowAttributes::new(reply.override_redirect, map_state, window_class))
    }

    fn set_wm_state(&self, client: Xid, wm_state: WmState) -> Result<()> {
        let atom = self.wm_state_atom()?;

        self.conn
            .change_property32(PropMode::REPLACE, *client, *atom, *atom, &[wm_state.as_u32(), 0])
            .map_err(x_err)?
            .check()
            .map_err(x_err)
    }

    fn set_prop(&self, client: Xid, name: &str, val: Prop) -> Result<()> {
        let atom = self.intern_atom(name)?;

        match val {
            Prop::Atom(names) => {
                let ids = names.iter().map(|n| self.intern_atom(n).map(|x| *x)).collect::<Result<Vec<_>>>()?;
                self.conn
                    .change_property32(PropMode::REPLACE, *client, *atom, x11rb::protocol::xproto::AtomEnum::ATOM, &ids)
                    .map_err(x_err)?
                    .check()
                    .map_err(x_err)
            }

            Prop::Bytes(vals) | Prop::Cardinal(vals) => self
                .conn
                .change_property32(PropMode::REPLACE, *client, *atom, x11rb::protocol::xproto::AtomEnum::CARDINAL, &vals)
                .map_err(x_err)?
                .check()
                .map_err(x_err),

            Prop::UTF8String(strs) => {
                let utf8_string = self.utf8_string_atom()?;
                let joined = strs.join("\0");
                self.conn
                    .change_property8(PropMode::REPLACE, *client, *atom, *utf8_string, joined.as_bytes())
                    .map_err(x_err)?
                    .check()
                    .map_err(x_err)
            }

            Prop::Window(ids) => {
                let raw: Vec<u32> = ids.iter().map(|id| **id).collect();
                self.conn
                    .change_property32(PropMode::REPLACE, *client, *atom, x11rb::protocol::xproto::AtomEnum::WINDOW, &raw)
                    .map_err(x_err)?
                    .check()
                    .map_err(x_err)
            }

            Prop::WmHints(_) | Prop::WmNormalHints(_) => {
                Err(Error::X11rb("writing WmHints/WmNormalHints back to a client is not supported".to_owned()))
            }
        }
    }

    fn delete_prop(&self, client: Xid, prop_name: &str) -> Result<()> {
        let atom = self.intern_atom(prop_name)?;

        self.conn.delete_property(*client, *atom).map_err(x_err)?.check().map_err(x_err)
    }

    fn set_client_attributes(&self, client: Xid, attrs: &[ClientAttr]) -> Result<()> {
        let mut aux = ChangeWindowAttributesAux::new();

        for attr in attrs {
            aux = match attr {
                ClientAttr::BorderColor(c) => aux.border_pixel(*c),
                ClientAttr::ClientEventMask => aux.event_mask(
                    EventMask::ENTER_WINDOW | EventMask::LEAVE_WINDOW | EventMask::PROPERTY_CHANGE | EventMask::STRUCTURE_NOTIFY,
                ),
                ClientAttr::ClientUnmapMask => aux.event_mask(EventMask::NO_EVENT),
                ClientAttr::RootEventMask => aux.event_mask(
                    EventMask::SUBSTRUCTURE_REDIRECT
                        | EventMask::SUBSTRUCTURE_NOTIFY
                        | EventMask::BUTTON_PRESS
                        | EventMask::ENTER_WINDOW
                        | EventMask::LEAVE_WINDOW
                        | EventMask::STRUCTURE_NOTIFY
                        | EventMask::PROPERTY_CHANGE,
                ),
            };
        }

        self.conn.change_window_attributes(*client, &aux).map_err(x_err)?.check().map_err(x_err)
    }

    fn set_client_config(&self, client: Xid, data: &[ClientConfig]) -> Result<()> {
        let mut aux = ConfigureWindowAux::new();

        for conf in data {
            aux = match conf {
                ClientConfig::BorderPx(px) => aux.border_width(*px),
                ClientConfig::Position(r) => aux.x(r.x as i32).y(r.y as i32).width(r.w).height(r.h),
                ClientConfig::StackBelow(id) => aux.sibling(**id).stack_mode(StackMode::BELOW),
                ClientConfig::StackAbove(id) => aux.sibling(**id).stack_mode(StackMode::ABOVE),
                ClientConfig::StackTop => aux.stack_mode(StackMode::ABOVE),
                ClientConfig::StackBottom => aux.stack_mode(StackMode::BELOW),
            };
        }

        self.conn.configure_window(*client, &aux).map_err(x_err)?.check().map_err(x_err)
    }

    fn send_client_message(&self, msg: ClientMessage) -> Result<()> {
        let type_ = self.intern_atom(&msg.dtype)?;

        let (format, data) = match msg.data {
            ClientMessageData::U8(d) => (8, x11rb::protocol::xproto::ClientMessageData::from(d)),
            ClientMessageData::U16(d) => (16, x11rb::protocol::xproto::ClientMessageData::from(d)),
            ClientMessageData::U32(d) => (32, x11rb::protocol::xproto::ClientMessageData::from(d)),
        };

        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format,
            sequence: 0,
            window: *msg.id,
            type_: *type_,
            data,
        };

        let mask = match msg.mask {
            ClientEventMask::SubstructureNotify => EventMask::SUBSTRUCTURE_NOTIFY,
            ClientEventMask::StructureNotify => EventMask::STRUCTURE_NOTIFY,
            ClientEventMask::NoEventMask => EventMask::NO_EVENT,
        };

        self.conn.send_event(false, *msg.id, mask, &event).map_err(x_err)?.check().map_err(x_err)
    }

    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        self.conn.warp_pointer(x11rb::NONE, *id, 0, 0, 0, 0, x, y).map_err(x_err)?.check().map_err(x_err)
    }
}

impl<C> std::fmt::Debug for Conn<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conn").field("root", &self.root).field("check_win", &self.check_win).finish()
    }
}
