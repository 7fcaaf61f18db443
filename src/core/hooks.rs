//! User defined hooks for injecting custom functionality into the window manager
//!
//! Hooks are the primary way of going beyond simple key and mouse bindings when
//! customising penrose. Each hook point is called at a well defined point during
//! normal operation (see the individual trait docs below) with full access to the
//! current [State] and the active [XConn], allowing you to run arbitrary logic and
//! mutate window manager state before control returns to the main event loop.
//!
//! Hooks compose: [Config][crate::core::Config] holds a single optional hook of
//! each kind and [State::compose_or_set_startup_hook] style helpers on `Config`
//! chain a new hook in front of (or in place of) whatever was set previously so
//! that multiple independent extensions can all contribute hooks of the same
//! kind.
use crate::{
    core::{State, Xid},
    x::{XConn, XEvent},
    Result,
};

/// A hook run once at window manager startup (after signal handlers are set and
/// key / mouse bindings have been grabbed) and optionally again after every
/// refresh of on screen state.
pub trait StateHook<X>
where
    X: XConn,
{
    /// Run this hook.
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()>;

    /// Box this hook up ready to be stored on a [Config][crate::core::Config].
    fn boxed(self) -> Box<dyn StateHook<X>>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }

    /// Compose this hook with another boxed hook, running this one first.
    fn then_boxed(self, next: Box<dyn StateHook<X>>) -> Box<dyn StateHook<X>>
    where
        Self: Sized + 'static,
        X: 'static,
    {
        Box::new(ComposedStateHook {
            first: Box::new(self),
            second: next,
        })
    }
}

impl<X, F> StateHook<X> for F
where
    X: XConn,
    F: FnMut(&mut State<X>, &X) -> Result<()>,
{
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        (self)(state, x)
    }
}

struct ComposedStateHook<X: XConn> {
    first: Box<dyn StateHook<X>>,
    second: Box<dyn StateHook<X>>,
}

impl<X: XConn> StateHook<X> for ComposedStateHook<X> {
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        self.first.call(state, x)?;
        self.second.call(state, x)
    }
}

/// A hook run against every [XEvent] received from the X server, before penrose's
/// own default handling of that event.
///
/// Returning `Ok(false)` suppresses the default handling of the event entirely:
/// use this when your hook has taken full responsibility for reacting to the
/// event in question.
pub trait EventHook<X>
where
    X: XConn,
{
    /// Run this hook, returning whether or not default event handling should
    /// still be run afterwards.
    fn call(&mut self, event: &XEvent, state: &mut State<X>, x: &X) -> Result<bool>;

    /// Box this hook up ready to be stored on a [Config][crate::core::Config].
    fn boxed(self) -> Box<dyn EventHook<X>>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }

    /// Compose this hook with another boxed hook, running both and requiring
    /// both to permit default handling for it to proceed.
    fn then_boxed(self, next: Box<dyn EventHook<X>>) -> Box<dyn EventHook<X>>
    where
        Self: Sized + 'static,
        X: 'static,
    {
        Box::new(ComposedEventHook {
            first: Box::new(self),
            second: next,
        })
    }
}

impl<X, F> EventHook<X> for F
where
    X: XConn,
    F: FnMut(&XEvent, &mut State<X>, &X) -> Result<bool>,
{
    fn call(&mut self, event: &XEvent, state: &mut State<X>, x: &X) -> Result<bool> {
        (self)(event, state, x)
    }
}

struct ComposedEventHook<X: XConn> {
    first: Box<dyn EventHook<X>>,
    second: Box<dyn EventHook<X>>,
}

impl<X: XConn> EventHook<X> for ComposedEventHook<X> {
    fn call(&mut self, event: &XEvent, state: &mut State<X>, x: &X) -> Result<bool> {
        let run_default = self.first.call(event, state, x)?;
        let run_default_2 = self.second.call(event, state, x)?;

        Ok(run_default && run_default_2)
    }
}

/// A hook run against a newly mapped client before it is added to the active
/// workspace.
///
/// This is the primary mechanism for deciding whether a new client should be
/// tiled as normal or instead floated, and where it should be floated to.
pub trait ManageHook<X>
where
    X: XConn,
{
    /// Run this hook against the newly managed client `id`.
    fn call(&mut self, id: Xid, state: &mut State<X>, x: &X) -> Result<()>;

    /// Box this hook up ready to be stored on a [Config][crate::core::Config].
    fn boxed(self) -> Box<dyn ManageHook<X>>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }

    /// Compose this hook with another boxed hook, running this one first.
    fn then_boxed(self, next: Box<dyn ManageHook<X>>) -> Box<dyn ManageHook<X>>
    where
        Self: Sized + 'static,
        X: 'static,
    {
        Box::new(ComposedManageHook {
            first: Box::new(self),
            second: next,
        })
    }
}

impl<X, F> ManageHook<X> for F
where
    X: XConn,
    F: FnMut(Xid, &mut State<X>, &X) -> Result<()>,
{
    fn call(&mut self, id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
        (self)(id, state, x)
    }
}

struct ComposedManageHook<X: XConn> {
    first: Box<dyn ManageHook<X>>,
    second: Box<dyn ManageHook<X>>,
}

impl<X: XConn> ManageHook<X> for ComposedManageHook<X> {
    fn call(&mut self, id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
        self.first.call(id, state, x)?;
        self.second.call(id, state, x)
    }
}
