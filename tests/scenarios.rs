//! Worked end-to-end scenarios for the stack algebra and the `MainAndStack`
//! layout, mirroring the examples used to design both.
//!
//! All scenarios share the same starting point: workspaces "1".."9" on a
//! single 1920x1080 screen, laid out with a single-master side-by-side
//! layout (ratio 0.5, ratio step 0.03).
use penrose::{
    builtin::layout::messages::{IncMain, ShrinkMain},
    core::layout::IntoMessage,
    pure::geometry::Rect,
    Xid,
};
use simple_test_case::test_case;

mod common;
use common::{map_client, new_stack_set, positions, scenario_layout};

/// S1: mapping three windows onto an empty workspace gives the first window
/// the master pane and leaves the other two splitting the remainder, with
/// focus tracking whichever window was mapped most recently.
#[test_case(0x100, Rect::new(0, 0, 960, 1080); "first window gets the master pane")]
#[test_case(0x101, Rect::new(960, 0, 960, 540); "second window gets the upper stack slot")]
#[test_case(0x102, Rect::new(960, 540, 960, 540); "third window gets the lower stack slot")]
#[test]
fn s1_mapping_three_windows(id: u32, expected: Rect) {
    let mut cs = new_stack_set();
    let mut layout = scenario_layout();

    map_client(&mut cs, 0x100);
    map_client(&mut cs, 0x101);
    map_client(&mut cs, 0x102);

    assert_eq!(cs.current_client(), Some(&Xid(0x102)), "last mapped window is focused");

    let rects = positions(&cs, &mut layout);
    let (_, r) = rects.iter().find(|(c, _)| *c == Xid(id)).expect("client is positioned");

    assert_eq!(*r, expected);
}

/// S2: focus_down wraps from the last window back to the master, and
/// swapping the focus with the head is a no-op when focus is already master.
#[test]
fn s2_focus_down_wraps_then_swap_master_is_a_no_op() {
    let mut cs = new_stack_set();

    map_client(&mut cs, 0x100);
    map_client(&mut cs, 0x101);
    map_client(&mut cs, 0x102);

    cs.focus_down();
    assert_eq!(cs.current_client(), Some(&Xid(0x100)), "focus wraps to the master window");

    let before: Vec<Xid> = cs.current_stack().unwrap().iter().copied().collect();
    cs.swap_focus_and_head();

    assert_eq!(cs.current_client(), Some(&Xid(0x100)), "focus is unchanged");
    let after: Vec<Xid> = cs.current_stack().unwrap().iter().copied().collect();
    assert_eq!(before, after, "stack order is unchanged: 0x100 was already master");
}

/// S3: viewing another workspace hides the current one without losing its
/// windows, and viewing it again restores the exact same layout.
#[test]
fn s3_view_another_tag_then_view_back_restores_geometry() {
    let mut cs = new_stack_set();
    let mut layout = scenario_layout();

    map_client(&mut cs, 0x100);
    map_client(&mut cs, 0x101);
    map_client(&mut cs, 0x102);

    let before = positions(&cs, &mut layout);

    cs.focus_tag("2");
    assert_eq!(cs.current_tag(), "2");
    assert!(cs.current_stack().is_none(), "workspace 2 starts empty");
    assert!(cs.workspace("1").unwrap().contains(&Xid(0x100)), "workspace 1 keeps its windows while hidden");

    cs.focus_tag("1");
    let after = positions(&cs, &mut layout);

    assert_eq!(before, after, "geometry is restored exactly");
}

/// S4: shifting the focused window to another tag removes exactly that
/// window from the current workspace and makes it the focus of its new one.
#[test]
fn s4_shift_focused_window_to_another_tag() {
    let mut cs = new_stack_set();
    let mut layout = scenario_layout();

    map_client(&mut cs, 0x100);
    map_client(&mut cs, 0x101);
    map_client(&mut cs, 0x102);

    cs.move_focused_to_tag("2");

    assert!(!cs.workspace("1").unwrap().contains(&Xid(0x102)), "0x102 left workspace 1");
    assert!(cs.workspace("2").unwrap().contains(&Xid(0x102)), "0x102 arrived on workspace 2");
    assert_eq!(cs.workspace("2").unwrap().focus(), Some(&Xid(0x102)), "0x102 is focused on workspace 2");
    assert_eq!(
        cs.workspace("1").unwrap().focus(),
        Some(&Xid(0x101)),
        "focus shifts to the nearest remaining neighbour above the removed window"
    );

    let rects = positions(&cs, &mut layout);
    assert_eq!(rects.len(), 2, "workspace 1 retains exactly the other two windows");
    let r100 = rects.iter().find(|(c, _)| *c == Xid(0x100)).unwrap().1;
    let r101 = rects.iter().find(|(c, _)| *c == Xid(0x101)).unwrap().1;
    assert_eq!(r100, Rect::new(0, 0, 960, 1080), "0x100 keeps the master pane");
    assert_eq!(r101, Rect::new(960, 0, 960, 1080), "0x101 takes the full-height stack slot");
}

/// S5: raising the master count puts every window up to the new count into
/// the master pane, splitting it evenly between them.
#[test]
fn s5_increasing_master_count_grows_the_master_pane() {
    let mut cs = new_stack_set();
    let mut layout = scenario_layout();

    map_client(&mut cs, 0x100);
    map_client(&mut cs, 0x101);
    map_client(&mut cs, 0x102);

    layout.handle_message(&IncMain(1).into_message());

    let rects = positions(&cs, &mut layout);
    let r100 = rects.iter().find(|(c, _)| *c == Xid(0x100)).unwrap().1;
    let r101 = rects.iter().find(|(c, _)| *c == Xid(0x101)).unwrap().1;
    let r102 = rects.iter().find(|(c, _)| *c == Xid(0x102)).unwrap().1;

    assert_eq!(r100, Rect::new(0, 0, 960, 540), "0x100 takes the top master slot");
    assert_eq!(r101, Rect::new(0, 540, 960, 540), "0x101 takes the bottom master slot");
    assert_eq!(r102, Rect::new(960, 0, 960, 1080), "0x102 fills the whole stack pane");
}

/// S6: the master/stack ratio clamps at `ratio_step` and never produces a
/// negative or overflowing pane width, however many times it is shrunk.
#[test]
fn s6_shrinking_the_ratio_clamps_and_never_goes_negative() {
    let mut cs = new_stack_set();
    let mut layout = scenario_layout();

    map_client(&mut cs, 0x100);
    map_client(&mut cs, 0x101);
    map_client(&mut cs, 0x102);

    for n in 1..=7 {
        layout.handle_message(&ShrinkMain.into_message());

        let rects = positions(&cs, &mut layout);
        let master = rects.iter().find(|(c, _)| *c == Xid(0x100)).unwrap().1;

        assert!(master.w > 0, "master pane never collapses to zero width (shrink {n})");
        assert!(master.w < 1920, "master pane never grows past the screen (shrink {n})");
    }

    let rects = positions(&cs, &mut layout);
    let master = rects.iter().find(|(c, _)| *c == Xid(0x100)).unwrap().1;
    assert_eq!(master.w, 556, "ratio clamps at 0.5 - 7*0.03 = 0.29, floor(1920*0.29) = 556");

    // Shrinking far beyond the clamp point must still never go negative.
    for _ in 0..50 {
        layout.handle_message(&ShrinkMain.into_message());
    }
    let rects = positions(&cs, &mut layout);
    let master = rects.iter().find(|(c, _)| *c == Xid(0x100)).unwrap().1;
    assert!(master.w > 0, "ratio floor holds even after many more shrinks");
}
