use std::any::Any;

/// A dynamically typed message to be sent to a [Layout][super::Layout] for processing.
///
/// Layouts inspect a `Message` with [Message::downcast_ref] against whichever
/// concrete marker types they know how to respond to and ignore anything they
/// don't recognise. This lets third party layouts and transformers introduce
/// their own message types without the core crate needing to know about them.
pub struct Message(Box<dyn Any>);

impl Message {
    /// Attempt to downcast this message to a concrete message type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

/// Marker trait for a type that can be sent as a [Message]
pub trait IntoMessage: Any {
    /// Wrap `self` up as a [Message] ready to be sent to a layout.
    fn into_message(self) -> Message
    where
        Self: Sized,
    {
        Message(Box::new(self))
    }
}

macro_rules! msg {
    ($m:ident) => {
        impl $crate::core::layout::messages::IntoMessage for $m {}
    };
}

/// Messages for common [Layout][super::Layout] operations that every built in
/// layout is expected to understand.
pub mod common {
    /// Alter the number of clients contained in the main area of the [Layout][crate::core::layout::Layout]
    pub struct IncMain(pub i8);
    msg!(IncMain);

    /// Expand the size of the main area of the [Layout][crate::core::layout::Layout]
    pub struct ExpandMain;
    msg!(ExpandMain);

    /// Shrink the size of the main area of the [Layout][crate::core::layout::Layout]
    pub struct ShrinkMain;
    msg!(ShrinkMain);

    /// Flip the layout along its horizontal axis
    pub struct Mirror;
    msg!(Mirror);

    /// Rotate the [Layout][crate::core::layout::Layout] to a new orientation
    pub struct Rotate;
    msg!(Rotate);

    /// Switch to the next layout available on the workspace
    pub struct NextLayout;
    msg!(NextLayout);

    /// Switch back to the first layout available on the workspace
    pub struct FirstLayout;
    msg!(FirstLayout);

    /// Unwrap a [LayoutTransformer][crate::builtin::layout::transformers::LayoutTransformer]
    /// to return the underlying layout.
    pub struct UnwrapTransformer;
    msg!(UnwrapTransformer);
}

/// Control messages sent by penrose itself during window manager operation. All layouts
/// (particularly those that are maintaining additional state) should consider handling these.
pub mod control {
    /// Sent when a [Layout][crate::core::layout::Layout] is no longer visible (e.g. the
    /// active layout on a workspace changed, or the workspace itself became hidden).
    pub struct Hide;
    msg!(Hide);

    /// Sent when penrose is shutting down or restarting so that layouts with
    /// external resources (subprocesses, file handles, ...) can release them.
    pub struct ShutDown;
    msg!(ShutDown);
}
