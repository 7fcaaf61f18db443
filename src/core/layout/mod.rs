//! Layout for window positioning
use crate::{
    core::Xid,
    pure::{geometry::Rect, Stack},
    Error, Result,
};
use std::collections::HashMap;

pub mod messages;

use messages::{
    common::{FirstLayout, NextLayout},
    Message,
};

pub use messages::IntoMessage;

/// Something that can be used to arrange the clients of a single [Workspace][crate::pure::Workspace]
/// on the screen.
///
/// Layouts are given the [Stack] of clients currently present on the workspace they are
/// attached to along with the available screen space and are expected to return the absolute
/// position each client should be placed at. Clients not included in the returned positions are
/// unmapped.
///
/// Layouts are free to hold on to their own internal state (current ratios, number of clients in
/// the main area, orientation, ...) and mutate that state in response to [Message]s sent via
/// [Layout::handle_message]. A layout can also choose to replace itself with a different layout
/// entirely (for example, a layout that only runs once and then reverts to the layout it was
/// inserted in front of) by returning `Some` from either [Layout::layout] or [Layout::handle_message].
pub trait Layout {
    /// The name to display in status bars or debug output for this layout.
    ///
    /// This does not need to be unique: sending messages to layouts is not
    /// dependent on the value returned from this method.
    fn name(&self) -> String;

    /// Clone this layout into a new boxed trait object.
    ///
    /// Used when a [LayoutStack] itself needs to be cloned (for example when
    /// adding a new workspace using the default set of layouts).
    fn boxed_clone(&self) -> Box<dyn Layout>;

    /// Given the stack of clients for the active workspace and the available
    /// screen real estate, generate the positions for each client that should
    /// be shown on screen.
    ///
    /// Returning `Some(layout)` replaces this layout in the [LayoutStack] with
    /// the returned one (useful for layouts that wrap or delegate to another).
    fn layout(&mut self, s: &Stack<Xid>, r: Rect) -> (Option<Box<dyn Layout>>, Vec<(Xid, Rect)>);

    /// As per [Layout::layout] but called when the workspace has no clients at all.
    fn layout_empty(&mut self, r: Rect) -> (Option<Box<dyn Layout>>, Vec<(Xid, Rect)>) {
        let _ = r;
        (None, vec![])
    }

    /// Respond to a [Message] sent to this layout.
    ///
    /// Returning `Some(layout)` replaces this layout in the [LayoutStack] with
    /// the returned one. Unrecognised messages should be ignored.
    fn handle_message(&mut self, m: &Message) -> Option<Box<dyn Layout>>;

    /// Produce a textual encoding of this layout's current state, used by
    /// [WindowManager::restart][crate::core::WindowManager] to persist the
    /// running [LayoutStack] of every workspace across a re-exec.
    ///
    /// The encoding must be free of the `;` and `|` bytes, which
    /// [LayoutStack::encode] reserves as separators, and must round-trip
    /// through a matching entry in a [LayoutRegistry] passed to
    /// [LayoutStack::decode].
    ///
    /// The default implementation encodes nothing beyond [Layout::name], which
    /// is correct for layouts with no mutable state. Layouts that carry state
    /// (ratios, a main-area client count, an axis, ...) should override this
    /// to also encode that state, and register a matching decode function.
    fn encode(&self) -> String {
        self.name()
    }
}

/// A function capable of reconstructing a boxed [Layout] from the string
/// produced by its [Layout::encode].
pub type LayoutDecodeFn = fn(&str) -> Result<Box<dyn Layout>>;

/// A lookup table from a layout's encoded tag to the function that can decode it.
///
/// Rust has no runtime reflection, so round-tripping a `Box<dyn Layout>` through
/// text needs an explicit tag -> constructor mapping rather than a derived
/// `Deserialize` impl: a [Config][crate::core::Config] that wants its layouts
/// to survive a [restart][crate::core::restart] registers each concrete
/// layout type it uses here.
#[derive(Clone)]
pub struct LayoutRegistry(HashMap<String, LayoutDecodeFn>);

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutRegistry {
    /// A registry understanding only [Full], the no-state fallback every
    /// [LayoutStack] can always be decoded into at least partially. Real
    /// configs should [register][LayoutRegistry::register] every concrete
    /// layout type their [Config][crate::core::Config] actually uses,
    /// typically via [`builtin::layout::registry`][crate::builtin::layout::registry].
    pub fn new() -> Self {
        let mut reg = Self(HashMap::new());
        reg.register("Full", |_| Ok(Full::boxed()));

        reg
    }

    /// Register the tag a layout's [Layout::encode] is expected to prefix its
    /// output with, along with the function that can decode it back.
    pub fn register(&mut self, tag: &str, decode: LayoutDecodeFn) -> &mut Self {
        self.0.insert(tag.to_owned(), decode);
        self
    }

    /// Decode a single layout from the string produced by its [Layout::encode].
    ///
    /// The tag used to look up the decode function is everything before the
    /// first `:` in `encoded` (or the whole string, for tag-only encodings
    /// such as the default [Layout::encode] impl).
    pub fn decode_one(&self, encoded: &str) -> Result<Box<dyn Layout>> {
        let tag = encoded.split(':').next().unwrap_or(encoded);
        let f = self
            .0
            .get(tag)
            .ok_or_else(|| Error::HydrationState(format!("unknown layout tag '{tag}'")))?;

        f(encoded)
    }
}

/// A minimal layout that gives the whole screen to the focused client and
/// hides the rest.
///
/// This exists so that [LayoutStack] has a sensible [Default] without
/// reaching for anything under [builtin][crate::builtin]: real configs are
/// expected to set `default_layouts` to something from
/// [`builtin::layout`][crate::builtin::layout] instead.
#[derive(Debug, Clone, Copy)]
pub struct Full;

impl Full {
    /// Construct a boxed [Full] layout
    pub fn boxed() -> Box<dyn Layout> {
        Box::new(Full)
    }
}

impl Layout for Full {
    fn name(&self) -> String {
        "Full".to_owned()
    }

    fn boxed_clone(&self) -> Box<dyn Layout> {
        Full::boxed()
    }

    fn layout(&mut self, s: &Stack<Xid>, r: Rect) -> (Option<Box<dyn Layout>>, Vec<(Xid, Rect)>) {
        (None, vec![(s.focus, r)])
    }

    fn handle_message(&mut self, _: &Message) -> Option<Box<dyn Layout>> {
        None
    }
}

impl std::fmt::Debug for dyn Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Layout({})", self.name())
    }
}

impl Clone for Box<dyn Layout> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Something that wraps an existing [Layout] and modifies either the region
/// it is given to work with or the positions that it returns.
///
/// Implementing this trait rather than [Layout] directly gives a blanket
/// [Layout] implementation that handles delegating `name`/`layout`/`handle_message`
/// down to the wrapped layout, and understands the
/// [UnwrapTransformer][messages::common::UnwrapTransformer] message for
/// removing the transformer and returning the underlying layout.
pub trait LayoutTransformer: 'static {
    /// The name to report for the wrapped layout, typically based on
    /// [Layout::name] of the inner layout.
    fn transformed_name(&self) -> String;

    /// Mutable access to the wrapped layout.
    fn inner_mut(&mut self) -> &mut Box<dyn Layout>;

    /// Modify the available screen region before it is passed to the inner layout.
    fn transform_initial(&self, r: Rect) -> Rect {
        r
    }

    /// Modify the positions returned by the inner layout before they are used.
    fn transform_positions(&mut self, r: Rect, positions: Vec<(Xid, Rect)>) -> Vec<(Xid, Rect)> {
        let _ = r;
        positions
    }
}

impl<T> Layout for T
where
    T: LayoutTransformer + Clone,
{
    fn name(&self) -> String {
        self.transformed_name()
    }

    fn boxed_clone(&self) -> Box<dyn Layout> {
        Box::new(self.clone())
    }

    fn layout(&mut self, s: &Stack<Xid>, r: Rect) -> (Option<Box<dyn Layout>>, Vec<(Xid, Rect)>) {
        let inner_r = self.transform_initial(r);
        let (new, positions) = self.inner_mut().layout(s, inner_r);
        if let Some(l) = new {
            *self.inner_mut() = l;
        }

        (None, self.transform_positions(r, positions))
    }

    fn layout_empty(&mut self, r: Rect) -> (Option<Box<dyn Layout>>, Vec<(Xid, Rect)>) {
        let inner_r = self.transform_initial(r);
        let (new, positions) = self.inner_mut().layout_empty(inner_r);
        if let Some(l) = new {
            *self.inner_mut() = l;
        }

        (None, self.transform_positions(r, positions))
    }

    fn handle_message(&mut self, m: &Message) -> Option<Box<dyn Layout>> {
        use messages::common::UnwrapTransformer;

        if m.downcast_ref::<UnwrapTransformer>().is_some() {
            return Some(self.inner_mut().boxed_clone());
        }

        if let Some(l) = self.inner_mut().handle_message(m) {
            *self.inner_mut() = l;
        }

        None
    }
}

/// A non-empty stack of layouts available to a given workspace.
///
/// Exactly one layout is focused (active) at a time. [IncMasterN][messages::common::IncMain] and
/// friends are sent to the focused layout, while [NextLayout] / [FirstLayout] cycle which layout
/// is active without affecting any individual layout's own state.
pub type LayoutStack = Stack<Box<dyn Layout>>;

impl Default for LayoutStack {
    fn default() -> Self {
        Stack::new([], Full::boxed(), [])
    }
}

impl Stack<Box<dyn Layout>> {
    /// Run the currently focused layout (or [Layout::layout_empty] if the workspace has no
    /// clients) to produce on screen positions for the given stack of clients.
    pub fn layout_workspace(
        &mut self,
        stack: Option<&Stack<Xid>>,
        r: Rect,
    ) -> Vec<(Xid, Rect)> {
        let (new_layout, positions) = match stack {
            Some(s) => self.focus.layout(s, r),
            None => self.focus.layout_empty(r),
        };

        if let Some(l) = new_layout {
            self.focus = l;
        }

        positions
    }

    /// Send a message to the currently focused layout.
    ///
    /// [NextLayout] and [FirstLayout] are intercepted here and used to move
    /// focus within the stack of available layouts rather than being passed
    /// down to any individual layout.
    pub fn handle_message<M>(&mut self, m: M)
    where
        M: IntoMessage,
    {
        let message = m.into_message();

        if message.downcast_ref::<NextLayout>().is_some() {
            self.focus_down();
            return;
        }

        if message.downcast_ref::<FirstLayout>().is_some() {
            self.focus_head();
            return;
        }

        if let Some(l) = self.focus.handle_message(&message) {
            self.focus = l;
        }
    }

    /// Send a message to every layout available to this workspace, not just the
    /// currently focused one.
    ///
    /// Unlike [Stack::handle_message] this does not intercept [NextLayout] /
    /// [FirstLayout]: it simply forwards the message to each layout in turn.
    pub fn broadcast_message<M>(&mut self, m: M)
    where
        M: IntoMessage,
    {
        let message = m.into_message();

        if let Some(l) = self.focus.handle_message(&message) {
            self.focus = l;
        }

        for l in self.up.iter_mut().chain(self.down.iter_mut()) {
            if let Some(new) = l.handle_message(&message) {
                *l = new;
            }
        }
    }

    /// Encode every layout available to this workspace (in stack order, with
    /// the focused layout marked) as a single string, suitable for persisting
    /// across a [restart][crate::core::restart].
    pub fn encode(&self) -> String {
        let before: Vec<String> = self.up.iter().rev().map(|l| l.encode()).collect();
        let after: Vec<String> = self.down.iter().map(|l| l.encode()).collect();

        format!("{}|{}|{}", before.join(";"), self.focus.encode(), after.join(";"))
    }

    /// Reconstruct a [LayoutStack] from the string produced by [LayoutStack::encode],
    /// using `registry` to decode each individual layout.
    pub fn decode(encoded: &str, registry: &LayoutRegistry) -> Result<Self> {
        let mut sections = encoded.splitn(3, '|');
        let malformed = || Error::HydrationState("malformed layout stack encoding".to_owned());

        let before = sections.next().ok_or_else(malformed)?;
        let current = sections.next().ok_or_else(malformed)?;
        let after = sections.next().ok_or_else(malformed)?;

        let decode_list = |s: &str| -> Result<Vec<Box<dyn Layout>>> {
            if s.is_empty() {
                Ok(vec![])
            } else {
                s.split(';').map(|enc| registry.decode_one(enc)).collect()
            }
        };

        let up = decode_list(before)?;
        let focus = registry.decode_one(current)?;
        let down = decode_list(after)?;

        Ok(Stack::new(up, focus, down))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack;

    #[test]
    fn default_layout_stack_has_a_single_full_layout() {
        let ls = LayoutStack::default();

        assert_eq!(ls.focus.name(), "Full");
        assert_eq!(ls.len(), 1);
    }

    #[test]
    fn next_layout_cycles_without_mutating_individual_layouts() {
        let mut ls: LayoutStack = stack!(Full::boxed(), Full::boxed(), Full::boxed());

        ls.handle_message(NextLayout);
        assert_eq!(ls.up.len(), 1);
        assert_eq!(ls.down.len(), 1);
    }

    #[test]
    fn first_layout_returns_focus_to_the_head() {
        let mut ls: LayoutStack = stack!([Full::boxed(), Full::boxed()], Full::boxed());
        ls.handle_message(NextLayout);

        ls.handle_message(messages::common::FirstLayout);
        assert_eq!(ls.up.len(), 0);
    }

    #[test]
    fn single_full_layout_stack_round_trips_through_encode_decode() {
        let ls: LayoutStack = stack!(Full::boxed());
        let registry = LayoutRegistry::new();

        let decoded = LayoutStack::decode(&ls.encode(), &registry).unwrap();

        assert_eq!(decoded.focus.name(), "Full");
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn multi_layout_stack_preserves_focus_position_through_encode_decode() {
        let ls: LayoutStack = stack!([Full::boxed()], Full::boxed(), [Full::boxed(), Full::boxed()]);
        let registry = LayoutRegistry::new();

        let decoded = LayoutStack::decode(&ls.encode(), &registry).unwrap();

        assert_eq!(decoded.up.len(), 1);
        assert_eq!(decoded.down.len(), 2);
    }

    #[test]
    fn decoding_an_unknown_tag_is_an_error() {
        let registry = LayoutRegistry::new();
        assert!(registry.decode_one("SomeLayoutNobodyRegistered:1:2").is_err());
    }
}
