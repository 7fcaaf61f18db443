//! Helpers and pre-defined actions for use in user defined key bindings
pub mod dynamic_select;

use crate::{
    core::{
        actions::{key_handler, modify_with},
        bindings::KeyEventHandler,
        layout::LayoutStack,
        State,
    },
    pure::geometry::Rect,
    util::spawn,
    x::{atom::Atom, property::Prop, XConn, XConnExt},
    Result, Xid,
};
use tracing::{error, info};

/// Exit penrose
///
/// Immediately exit the window manager with exit code 0.
pub fn exit<X>() -> Box<dyn KeyEventHandler<X>>
where
    X: XConn,
{
    key_handler(|_, _| std::process::exit(0))
}

/// Info log the current window manager [State].
pub fn log_current_state<X>() -> Box<dyn KeyEventHandler<X>>
where
    X: XConn + std::fmt::Debug,
{
    key_handler(|s: &mut State<X>, _| {
        info!("Current Window Manager State: {s:#?}");
        Ok(())
    })
}

/// Jump to, or create, a [Workspace]
///
/// Call 'get_name' to obtain a Workspace name and check to see if there is currently a Workspace
/// with that name being managed by the WindowManager. If there is no existing workspace with the
/// given name, create it with the supplied available layouts. If a matching Workspace _does_
/// already exist then simply switch focus to it. This action is most useful when combined with the
/// DefaultWorkspace hook that allows for auto populating named Workspaces when first focusing them.
pub fn create_or_switch_to_workspace<X>(
    get_name: fn() -> Option<String>,
    layouts: LayoutStack,
) -> Box<dyn KeyEventHandler<X>>
where
    X: XConn + std::fmt::Debug,
{
    modify_with(move |cs| {
        if let Some(name) = get_name() {
            if !cs.contains_tag(&name) {
                cs.add_workspace(&name, layouts.clone());
            }

            cs.focus_tag(&name);
        }
    })
}

/// Focus a client with the given class as `WM_CLASS` or spawn the program with the given command
/// if no such client exists.
///
/// This is useful for key bindings that are based on the program you want to work with rather than
/// having to remember where things are running.
pub fn focus_or_spawn<X>(class: &'static str, command: &'static str) -> Box<dyn KeyEventHandler<X>>
where
    X: XConn + std::fmt::Debug,
{
    key_handler(move |s: &mut State<X>, x: &X| {
        let mut client = None;

        for &id in s.client_set.iter_clients() {
            if let Some(Prop::UTF8String(classes)) = x.get_prop(id, Atom::WmClass.as_ref())? {
                if classes.iter().any(|s| s == class) {
                    client = Some(id);
                    break;
                }
            }
        }

        x.modify_and_refresh(s, |cs| {
            if let Some(id) = client {
                cs.focus_client(&id)
            } else if let Err(e) = spawn(command) {
                error!(%e, %command, "unable to spawn program")
            }
        })
    })
}

/// The requested change in `_NET_WM_STATE_FULLSCREEN` for a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullScreenAction {
    /// Make the client fullscreen
    Add,
    /// Restore the client to its previous position
    Remove,
    /// Swap between fullscreen and the previous position
    Toggle,
}

#[derive(Default)]
struct FullScreenClients(std::collections::HashMap<Xid, Option<Rect>>);

/// Set, clear or toggle the fullscreen state of a client.
///
/// Fullscreening floats the client to cover the entire focused screen, recording
/// its previous floating position (if any) so that it can be restored when the
/// client is un-fullscreened.
pub fn set_fullscreen_state<X: XConn>(
    id: Xid,
    action: FullScreenAction,
    state: &mut State<X>,
    x: &X,
) -> Result<()> {
    if state.extension::<FullScreenClients>().is_err() {
        state.add_extension(FullScreenClients::default());
    }
    let ext = state.extension::<FullScreenClients>()?;

    let currently_fullscreen = ext.borrow().0.contains_key(&id);
    let make_fullscreen = match action {
        FullScreenAction::Add => true,
        FullScreenAction::Remove => false,
        FullScreenAction::Toggle => !currently_fullscreen,
    };

    if make_fullscreen == currently_fullscreen {
        return Ok(());
    }

    if make_fullscreen {
        let prev = state.client_set.floating.get(&id).map(|r| r.applied_to(&state.client_set.screens.focus.r));
        ext.borrow_mut().0.insert(id, prev);

        let r = state.client_set.screens.focus.r;
        x.modify_and_refresh(state, |cs| cs.float_unchecked(id, r))?;

        x.set_prop(
            id,
            Atom::NetWmState.as_ref(),
            Prop::Atom(vec![Atom::NetWmStateFullscreen.as_ref().to_owned()]),
        )
    } else {
        let prev = ext.borrow_mut().0.remove(&id).flatten();

        x.modify_and_refresh(state, |cs| match prev {
            Some(r) => cs.float_unchecked(id, r),
            None => {
                cs.sink(&id);
            }
        })?;

        x.delete_prop(id, Atom::NetWmState.as_ref())
    }
}
