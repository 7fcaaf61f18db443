//! The top level error type and result alias used throughout the crate
use crate::core::Xid;
use std::any::TypeId;

/// Enum to store the various ways that penrose can fail
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A client that should be tracked in the given [Screen][crate::pure::Screen] is not visible
    #[error("client {0} is not visible")]
    ClientIsNotVisible(Xid),

    /// The underlying connection to the X server is closed
    #[error("the underlying connection to the X server is closed")]
    ConnectionClosed,

    /// A generic error raised from user code
    #[error("{0}")]
    Custom(String),

    /// Attempting to restore a previous session failed because the serialized
    /// state no longer matches the set of clients currently mapped on the X server
    #[error("unable to hydrate previous state: {0}")]
    HydrationState(String),

    /// Wm(Normal)Hints received from the X server were invalid
    #[error("invalid window hints property: {0}")]
    InvalidHints(String),

    /// A config specified fewer workspace names than there are connected screens
    #[error("at least one workspace is required per screen, got {n_ws} tags for {n_screens} screens")]
    InsufficientWorkspaces {
        /// number of workspace tags provided
        n_ws: usize,
        /// number of connected screens
        n_screens: usize,
    },

    /// The client IDs referenced in a restart payload did not match currently known clients
    #[error("client ids in restart state do not match currently managed clients")]
    MissingClientIds,

    /// The requested property is not set for the given client
    #[error("the {0} property is not set for client {1}")]
    MissingProperty(String, Xid),

    /// No connected screens were found when initialising the window manager
    #[error("unable to find any connected screens")]
    NoScreens,

    /// Workspace tags must be unique
    #[error("workspace tags must be unique, found duplicates: {tags:?}")]
    NonUniqueTags { tags: Vec<String> },

    /// A generic error type carrying a human readable message
    #[error("{0}")]
    Raw(String),

    /// Spawning an external process failed
    #[error("unable to spawn process: {0}")]
    SpawnProc(String),

    /// An io error bubbled up from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An error returned from the underlying x11rb connection to the X server
    #[cfg(feature = "x11rb")]
    #[error("x11 connection error: {0}")]
    X11rb(String),

    /// Attempting to call a mock method on a [MockXConn][crate::x::mock::MockXConn]
    /// that has no implementation provided
    #[error("this MockXConn method has not been given an implementation")]
    UnimplementedMock,

    /// A config specified an unknown modifier key in a keybinding
    #[error("{0} is not a known modifier key")]
    UnknownModifier(String),

    /// An attempt was made to reference a client that is not known to penrose
    #[error("{0} is not a known client")]
    UnknownClient(Xid),

    /// An attempt was made to look up a state extension that has not been registered
    #[error("no state extension of the requested type has been registered")]
    UnknownStateExtension {
        /// The [TypeId] of the extension type that was requested
        type_id: TypeId,
    },

    /// Parsing an [Atom][crate::x::atom::Atom] from a str failed because the requested
    /// name is not a known atom
    #[error("{0} is not a known atom")]
    UnknownAtom(String),

    /// An explicit request to tear down the window manager and exit the process.
    ///
    /// Unlike every other variant this is allowed to propagate out through the
    /// per-event error boundary (see [WindowManager::run][crate::core::WindowManager::run])
    /// rather than being caught, logged and discarded.
    #[error("exiting with status {0}")]
    Exit(i32),
}

/// Result type for fallible operations throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
