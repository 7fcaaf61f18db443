//! Shared helpers for the worked end-to-end scenarios in `scenarios.rs`.
use penrose::{
    builtin::layout::MainAndStack,
    core::layout::LayoutStack,
    pure::{geometry::Rect, Position, StackSet},
    Xid,
};

pub fn screen() -> Rect {
    Rect::new(0, 0, 1920, 1080)
}

/// A `StackSet` with workspaces `"1"` through `"9"` on a single 1920x1080
/// screen, matching the initial conditions for the S1-S6 scenarios.
pub fn new_stack_set() -> StackSet<Xid> {
    let tags = (1..=9).map(|n| n.to_string());
    StackSet::try_new(LayoutStack::default(), tags, vec![screen()]).expect("valid stack set")
}

/// The layout used throughout the S1-S6 scenarios: a single master window to
/// the left, ratio 0.5 and a 0.03 step between master and stack regions.
pub fn scenario_layout() -> MainAndStack {
    MainAndStack::side_unboxed(1, 0.5, 0.03, false)
}

/// Map a new client the same way the manage pipeline does for a fresh,
/// non-transient `MapRequest`: appended after the existing stack, then
/// focused without disturbing anyone else's position.
pub fn map_client(cs: &mut StackSet<Xid>, id: u32) {
    let client = Xid(id);
    cs.insert_at(Position::Tail, client);
    cs.focus_client(&client);
}

/// Run the given layout over the current workspace's stack on `SCREEN`,
/// returning the resulting positions sorted by client id for easy assertions.
pub fn positions(cs: &StackSet<Xid>, layout: &mut MainAndStack) -> Vec<(Xid, Rect)> {
    use penrose::core::layout::Layout;

    let mut positions = match cs.current_stack() {
        Some(s) => layout.layout(s, screen()).1,
        None => Vec::new(),
    };
    positions.sort_by_key(|(id, _)| *id);

    positions
}
