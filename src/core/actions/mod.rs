//! Helpers and pre-defined actions for use in user defined key and mouse bindings
use crate::{
    core::{
        bindings::{KeyEventHandler, MouseEventHandler},
        layout::IntoMessage,
        ClientSet, State,
    },
    util,
    x::{XConn, XConnExt},
    Error, Result,
};
use tracing::info;

// NOTE: this is here to force the correct lifetime requirements on closures being
//       used as handlers. The generic impl for functions of the right signature
//       isn't sufficient on its own.

/// Construct a [KeyEventHandler] from a closure or free function
pub fn key_handler<F, X>(f: F) -> Box<dyn KeyEventHandler<X>>
where
    F: FnMut(&mut State<X>, &X) -> Result<()> + 'static,
    X: XConn,
{
    Box::new(f)
}

/// Mutate the [ClientSet] and refresh the on screen state
pub fn modify_with<F, X>(f: F) -> Box<dyn KeyEventHandler<X>>
where
    F: FnMut(&mut ClientSet) + Clone + 'static,
    X: XConn,
{
    Box::new(move |s: &mut State<X>, x: &X| x.modify_and_refresh(s, f.clone()))
}

/// Send a message to the currently active layout
pub fn send_layout_message<F, M, X>(f: F) -> Box<dyn KeyEventHandler<X>>
where
    F: Fn() -> M + 'static,
    M: IntoMessage,
    X: XConn,
{
    key_handler(move |s: &mut State<X>, x: &X| {
        x.modify_and_refresh(s, |cs| {
            cs.current_workspace_mut().handle_message(f());
        })
    })
}

/// Send a message to all layouts available to the current workspace
pub fn broadcast_layout_message<F, M, X>(f: F) -> Box<dyn KeyEventHandler<X>>
where
    F: Fn() -> M + 'static,
    M: IntoMessage,
    X: XConn,
{
    key_handler(move |s: &mut State<X>, x: &X| {
        x.modify_and_refresh(s, |cs| {
            cs.current_workspace_mut().broadcast_message(f());
        })
    })
}

/// Cycle to the next layout available on the current workspace
pub fn next_layout<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    modify_with(|cs| cs.next_layout())
}

/// Cycle to the previous layout available on the current workspace
pub fn previous_layout<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    modify_with(|cs| cs.previous_layout())
}

/// Spawn an external program as part of a key or mouse binding
pub fn spawn<X>(program: &'static str) -> Box<dyn KeyEventHandler<X>>
where
    X: XConn,
{
    key_handler(move |_, _| util::spawn(program))
}

/// Exit the window manager, returning control to whatever invoked it.
///
/// Raises [Error::Exit], the one error the event loop's error boundary does
/// not absorb: `run` returns `Err(Error::Exit(0))` rather than the process
/// being killed outright, giving the embedding binary a chance to perform a
/// restart before actually exiting.
pub fn exit<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    key_handler(|_: &mut State<X>, _| Err(Error::Exit(0)))
}

/// Recompile the running configuration from source and, if that succeeds,
/// `exec` the freshly built binary in place with the current [ClientSet]
/// serialized for the new process to resume from.
///
/// A failed recompile leaves the running instance untouched (see
/// [restart::recompile][crate::core::restart::recompile]); a failed `exec`
/// is returned as an error from the handler like any other failed action,
/// which the event loop's error boundary will log and discard.
pub fn restart<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    key_handler(|s: &mut State<X>, _| {
        crate::core::restart::recompile(&s.config.recompile, false)?;
        crate::core::restart::restart(&s.config.recompile, &mut s.client_set)
    })
}

/// Info log the current window manager [State] for debugging purposes.
pub fn log_current_state<X: XConn + std::fmt::Debug>() -> Box<dyn KeyEventHandler<X>> {
    key_handler(|s: &mut State<X>, _| {
        info!("current window manager state: {s:#?}");
        Ok(())
    })
}

/// Remove the currently focused client from state and unmap it WITHOUT
/// closing the client program.
///
/// This is provided for removing clients that have been accidentally tiled
/// when they should have been ignored.
pub fn remove_and_unmap_focused_client<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    key_handler(|s: &mut State<X>, x: &X| {
        if let Some(client) = s.client_set.remove_focused() {
            info!(?client, "unmapping focused client following removal from state");
            x.unmap(client)
        } else {
            Ok(())
        }
    })
}

/// Kill the currently focused client, asking the underlying program to close
/// gracefully via `WM_DELETE_WINDOW` if it supports that protocol, or killing
/// it outright via the X server if it does not.
pub fn kill_focused<X: XConn>() -> Box<dyn KeyEventHandler<X>> {
    key_handler(|s: &mut State<X>, x: &X| x.kill_focused(s))
}

/// Construct a [MouseEventHandler] from a closure or free function.
///
/// The resulting handler will run on button press events.
pub fn mouse_handler<F, X>(f: F) -> Box<dyn MouseEventHandler<X>>
where
    F: FnMut(&mut State<X>, &X) -> Result<()> + 'static,
    X: XConn,
{
    Box::new(f)
}

/// Mutate the [ClientSet] and refresh the on screen state
pub fn mouse_modify_with<F, X>(f: F) -> Box<dyn MouseEventHandler<X>>
where
    F: FnMut(&mut ClientSet) + Clone + 'static,
    X: XConn,
{
    Box::new(move |s: &mut State<X>, x: &X| x.modify_and_refresh(s, f.clone()))
}
