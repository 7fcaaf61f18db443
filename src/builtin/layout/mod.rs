//! Built-in layouts.
use crate::{
    builtin::layout::messages::{ExpandMain, IncMain, Mirror, Rotate, ShrinkMain},
    core::layout::{Layout, LayoutRegistry, Message},
    pure::{geometry::Rect, Stack},
    Error, Result, Xid,
};

pub mod messages;
pub mod transformers;

#[derive(Debug, Clone, Copy)]
enum StackPosition {
    Side,
    Bottom,
}

/// A simple [Layout] with main and secondary regions.
///
/// - `MainAndStack::side` give a main region to the left and remaining clients to the right.
/// - `MainAndStack::bottom` give a main region to the top and remaining clients to the bottom.
///
/// The ratio between the main and secondary stack regions can be adjusted by sending [ShrinkMain]
/// and [ExpandMain] messages to this layout. The number of clients in the main area can be
/// increased or decreased by sending an [IncMain] message. To flip between the side and bottom
/// behaviours you can send a [Rotate] message.
#[derive(Debug, Clone, Copy)]
pub struct MainAndStack {
    pos: StackPosition,
    max_main: u32,
    ratio: f32,
    ratio_step: f32,
    mirrored: bool,
}

impl MainAndStack {
    pub fn side(max_main: u32, ratio: f32, ratio_step: f32) -> Box<dyn Layout> {
        Box::new(Self::side_unboxed(max_main, ratio, ratio_step, false))
    }

    pub fn side_mirrored(max_main: u32, ratio: f32, ratio_step: f32) -> Box<dyn Layout> {
        Box::new(Self::side_unboxed(max_main, ratio, ratio_step, true))
    }

    pub fn side_unboxed(max_main: u32, ratio: f32, ratio_step: f32, mirrored: bool) -> Self {
        Self {
            pos: StackPosition::Side,
            max_main,
            ratio,
            ratio_step,
            mirrored,
        }
    }

    pub fn bottom(max_main: u32, ratio: f32, ratio_step: f32) -> Box<dyn Layout> {
        Box::new(Self::bottom_unboxed(max_main, ratio, ratio_step, false))
    }

    pub fn bottom_mirrored(max_main: u32, ratio: f32, ratio_step: f32) -> Box<dyn Layout> {
        Box::new(Self::bottom_unboxed(max_main, ratio, ratio_step, true))
    }

    pub fn bottom_unboxed(max_main: u32, ratio: f32, ratio_step: f32, mirrored: bool) -> Self {
        Self {
            pos: StackPosition::Bottom,
            max_main,
            ratio,
            ratio_step,
            mirrored,
        }
    }

    fn split(&self, d: u32) -> u32 {
        let ratio = if self.mirrored {
            1.0 - self.ratio
        } else {
            self.ratio
        };

        ((d as f32) * ratio) as u32
    }

    fn layout_side(&self, s: &Stack<Xid>, r: Rect) -> Vec<(Xid, Rect)> {
        let n = s.len() as u32;

        if n <= self.max_main || self.max_main == 0 {
            // In both cases we have all windows in a single stack (all main or all secondary)
            r.as_rows(n).iter().zip(s).map(|(r, c)| (*c, *r)).collect()
        } else {
            // We have two stacks so split the screen in two and then build a stack for each
            let split = self.split(r.w);
            let (mut main, mut stack) = r.split_at_width(split).expect("split point to be valid");
            if self.mirrored {
                (main, stack) = (stack, main);
            }

            main.as_rows(self.max_main)
                .into_iter()
                .chain(stack.as_rows(n.saturating_sub(self.max_main)))
                .zip(s)
                .map(|(r, c)| (*c, r))
                .collect()
        }
    }

    fn layout_bottom(&self, s: &Stack<Xid>, r: Rect) -> Vec<(Xid, Rect)> {
        let n = s.len() as u32;

        if n <= self.max_main || self.max_main == 0 {
            r.as_columns(n)
                .iter()
                .zip(s)
                .map(|(r, c)| (*c, *r))
                .collect()
        } else {
            let split = self.split(r.h);
            let (mut main, mut stack) = r.split_at_height(split).expect("split point to be valid");
            if self.mirrored {
                (main, stack) = (stack, main);
            }

            main.as_columns(self.max_main)
                .into_iter()
                .chain(stack.as_columns(n.saturating_sub(self.max_main)))
                .zip(s)
                .map(|(r, c)| (*c, r))
                .collect()
        }
    }
}

impl Default for MainAndStack {
    fn default() -> Self {
        Self {
            pos: StackPosition::Side,
            max_main: 1,
            ratio: 0.6,
            ratio_step: 0.1,
            mirrored: false,
        }
    }
}

impl Layout for MainAndStack {
    fn name(&self) -> String {
        match (self.pos, self.mirrored) {
            (StackPosition::Side, false) => "Side".to_owned(),
            (StackPosition::Side, true) => "Mirror".to_owned(),
            (StackPosition::Bottom, false) => "Bottom".to_owned(),
            (StackPosition::Bottom, true) => "Top".to_owned(),
        }
    }

    fn boxed_clone(&self) -> Box<dyn Layout> {
        Box::new(*self)
    }

    fn layout(&mut self, s: &Stack<Xid>, r: Rect) -> (Option<Box<dyn Layout>>, Vec<(Xid, Rect)>) {
        let positions = match self.pos {
            StackPosition::Side => self.layout_side(s, r),
            StackPosition::Bottom => self.layout_bottom(s, r),
        };

        (None, positions)
    }

    fn handle_message(&mut self, m: &Message) -> Option<Box<dyn Layout>> {
        if let Some(&ExpandMain) = m.downcast_ref() {
            self.ratio = (self.ratio + self.ratio_step).min(1.0 - self.ratio_step);
        } else if let Some(&ShrinkMain) = m.downcast_ref() {
            self.ratio = (self.ratio - self.ratio_step).max(self.ratio_step);
        } else if let Some(&IncMain(n)) = m.downcast_ref() {
            self.max_main = (self.max_main as i64 + n as i64).max(1) as u32;
        } else if let Some(&Mirror) = m.downcast_ref() {
            self.mirrored = !self.mirrored;
        } else if let Some(&Rotate) = m.downcast_ref() {
            self.pos = match self.pos {
                StackPosition::Side => StackPosition::Bottom,
                StackPosition::Bottom => StackPosition::Side,
            };
        }

        None
    }

    fn encode(&self) -> String {
        let pos = match self.pos {
            StackPosition::Side => "Side",
            StackPosition::Bottom => "Bottom",
        };

        format!(
            "MainAndStack:{pos}:{}:{}:{}:{}",
            self.max_main, self.ratio, self.ratio_step, self.mirrored
        )
    }
}

fn decode_main_and_stack(encoded: &str) -> Result<Box<dyn Layout>> {
    let malformed = || Error::HydrationState(format!("malformed MainAndStack encoding: {encoded}"));
    let mut parts = encoded.split(':');

    parts.next().ok_or_else(malformed)?; // tag
    let pos = match parts.next().ok_or_else(malformed)? {
        "Side" => StackPosition::Side,
        "Bottom" => StackPosition::Bottom,
        _ => return Err(malformed()),
    };
    let max_main: u32 = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let ratio: f32 = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let ratio_step: f32 = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let mirrored: bool = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;

    Ok(Box::new(MainAndStack {
        pos,
        max_main,
        ratio,
        ratio_step,
        mirrored,
    }))
}

/// A simple monolce layout that gives the maximum available space to the currently
/// focused client and unmaps all other windows.
#[derive(Debug, Clone, Copy)]
pub struct Monocle;

impl Monocle {
    pub fn boxed() -> Box<dyn Layout> {
        Box::new(Monocle)
    }
}

impl Layout for Monocle {
    fn name(&self) -> String {
        "Mono".to_owned()
    }

    fn boxed_clone(&self) -> Box<dyn Layout> {
        Self::boxed()
    }

    fn layout(&mut self, s: &Stack<Xid>, r: Rect) -> (Option<Box<dyn Layout>>, Vec<(Xid, Rect)>) {
        (None, vec![(s.focus, r)])
    }

    fn handle_message(&mut self, _: &Message) -> Option<Box<dyn Layout>> {
        None
    }
}

/// Arrange all clients into a roughly square grid, giving each an equal share
/// of the screen.
#[derive(Debug, Clone, Copy)]
pub struct Grid;

impl Grid {
    pub fn boxed() -> Box<dyn Layout> {
        Box::new(Grid)
    }
}

impl Layout for Grid {
    fn name(&self) -> String {
        "Grid".to_owned()
    }

    fn boxed_clone(&self) -> Box<dyn Layout> {
        Self::boxed()
    }

    fn layout(&mut self, s: &Stack<Xid>, r: Rect) -> (Option<Box<dyn Layout>>, Vec<(Xid, Rect)>) {
        let n = s.len() as u32;
        let n_cols = (n as f64).sqrt().ceil().max(1.0) as u32;
        let cols = r.as_columns(n_cols);
        let mut clients = s.iter();
        let mut positions = Vec::with_capacity(n as usize);

        for (i, col) in cols.iter().enumerate() {
            let remaining_cols = n_cols as usize - i;
            let remaining_clients = (n as usize).saturating_sub(positions.len());
            let n_rows = remaining_clients.div_ceil(remaining_cols.max(1)) as u32;

            for row in col.as_rows(n_rows) {
                match clients.next() {
                    Some(&c) => positions.push((c, row)),
                    None => break,
                }
            }
        }

        (None, positions)
    }

    fn handle_message(&mut self, _: &Message) -> Option<Box<dyn Layout>> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
enum CenterAxis {
    Vertical,
    Horizontal,
}

/// A layout with a centered main region and remaining clients split evenly
/// between the two sides flanking it.
///
/// `CenteredMain::vertical` centers the main region as a column with
/// secondary clients tiled to its left and right. `CenteredMain::horizontal`
/// centers the main region as a row with secondary clients tiled above and
/// below.
///
/// As with [MainAndStack], [ShrinkMain] and [ExpandMain] adjust the ratio
/// given to the main region and [IncMain] adjusts how many clients it holds.
#[derive(Debug, Clone, Copy)]
pub struct CenteredMain {
    axis: CenterAxis,
    max_main: u32,
    ratio: f32,
    ratio_step: f32,
}

impl CenteredMain {
    pub fn vertical(max_main: u32, ratio: f32, ratio_step: f32) -> Box<dyn Layout> {
        Box::new(Self::vertical_unboxed(max_main, ratio, ratio_step))
    }

    pub fn vertical_unboxed(max_main: u32, ratio: f32, ratio_step: f32) -> Self {
        Self {
            axis: CenterAxis::Vertical,
            max_main,
            ratio,
            ratio_step,
        }
    }

    pub fn horizontal(max_main: u32, ratio: f32, ratio_step: f32) -> Box<dyn Layout> {
        Box::new(Self::horizontal_unboxed(max_main, ratio, ratio_step))
    }

    pub fn horizontal_unboxed(max_main: u32, ratio: f32, ratio_step: f32) -> Self {
        Self {
            axis: CenterAxis::Horizontal,
            max_main,
            ratio,
            ratio_step,
        }
    }

    fn layout_flanked(&self, s: &Stack<Xid>, r: Rect) -> Vec<(Xid, Rect)> {
        let n = s.len() as u32;

        if n <= self.max_main || self.max_main == 0 {
            return match self.axis {
                CenterAxis::Vertical => r.as_rows(n),
                CenterAxis::Horizontal => r.as_columns(n),
            }
            .iter()
            .zip(s)
            .map(|(r, c)| (*c, *r))
            .collect();
        }

        let (main, side_a, side_b) = match self.axis {
            CenterAxis::Vertical => {
                let main_w = ((r.w as f32) * self.ratio) as u32;
                let side_w = (r.w.saturating_sub(main_w)) / 2;
                (
                    Rect::new(r.x + side_w, r.y, main_w, r.h),
                    Rect::new(r.x, r.y, side_w, r.h),
                    Rect::new(r.x + side_w + main_w, r.y, r.w - side_w - main_w, r.h),
                )
            }
            CenterAxis::Horizontal => {
                let main_h = ((r.h as f32) * self.ratio) as u32;
                let side_h = (r.h.saturating_sub(main_h)) / 2;
                (
                    Rect::new(r.x, r.y + side_h, r.w, main_h),
                    Rect::new(r.x, r.y, r.w, side_h),
                    Rect::new(r.x, r.y + side_h + main_h, r.w, r.h - side_h - main_h),
                )
            }
        };

        let remaining = n - self.max_main;
        let n_a = remaining / 2;
        let n_b = remaining - n_a;

        let main_rects = match self.axis {
            CenterAxis::Vertical => main.as_rows(self.max_main),
            CenterAxis::Horizontal => main.as_columns(self.max_main),
        };
        let a_rects = match self.axis {
            CenterAxis::Vertical => side_a.as_rows(n_a),
            CenterAxis::Horizontal => side_a.as_columns(n_a),
        };
        let b_rects = match self.axis {
            CenterAxis::Vertical => side_b.as_rows(n_b),
            CenterAxis::Horizontal => side_b.as_columns(n_b),
        };

        main_rects
            .into_iter()
            .chain(a_rects)
            .chain(b_rects)
            .zip(s)
            .map(|(r, c)| (*c, r))
            .collect()
    }
}

impl Layout for CenteredMain {
    fn name(&self) -> String {
        match self.axis {
            CenterAxis::Vertical => "Centered".to_owned(),
            CenterAxis::Horizontal => "CenteredHorizontal".to_owned(),
        }
    }

    fn boxed_clone(&self) -> Box<dyn Layout> {
        Box::new(*self)
    }

    fn layout(&mut self, s: &Stack<Xid>, r: Rect) -> (Option<Box<dyn Layout>>, Vec<(Xid, Rect)>) {
        (None, self.layout_flanked(s, r))
    }

    fn handle_message(&mut self, m: &Message) -> Option<Box<dyn Layout>> {
        if let Some(&ExpandMain) = m.downcast_ref() {
            self.ratio = (self.ratio + self.ratio_step).min(1.0 - self.ratio_step);
        } else if let Some(&ShrinkMain) = m.downcast_ref() {
            self.ratio = (self.ratio - self.ratio_step).max(self.ratio_step);
        } else if let Some(&IncMain(n)) = m.downcast_ref() {
            self.max_main = (self.max_main as i64 + n as i64).max(1) as u32;
        }

        None
    }

    fn encode(&self) -> String {
        let axis = match self.axis {
            CenterAxis::Vertical => "Vertical",
            CenterAxis::Horizontal => "Horizontal",
        };

        format!(
            "CenteredMain:{axis}:{}:{}:{}",
            self.max_main, self.ratio, self.ratio_step
        )
    }
}

fn decode_centered_main(encoded: &str) -> Result<Box<dyn Layout>> {
    let malformed = || Error::HydrationState(format!("malformed CenteredMain encoding: {encoded}"));
    let mut parts = encoded.split(':');

    parts.next().ok_or_else(malformed)?; // tag
    let axis = match parts.next().ok_or_else(malformed)? {
        "Vertical" => CenterAxis::Vertical,
        "Horizontal" => CenterAxis::Horizontal,
        _ => return Err(malformed()),
    };
    let max_main: u32 = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let ratio: f32 = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    let ratio_step: f32 = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;

    Ok(Box::new(CenteredMain {
        axis,
        max_main,
        ratio,
        ratio_step,
    }))
}

/// A [LayoutRegistry] that understands every layout defined in this module,
/// for use with [`Config::default_layouts`][crate::core::Config] that draws
/// from `builtin::layout` and wants those layouts to survive a
/// [restart][crate::core::restart].
pub fn registry() -> LayoutRegistry {
    let mut reg = LayoutRegistry::new();
    reg.register("MainAndStack", decode_main_and_stack);
    reg.register("Mono", |_| Ok(Monocle::boxed()));
    reg.register("Grid", |_| Ok(Grid::boxed()));
    reg.register("CenteredMain", decode_centered_main);

    reg
}

#[cfg(test)]
mod quickcheck_tests;

#[cfg(test)]
mod tests {
    use crate::{
        builtin::layout::{messages::IncMain, *},
        core::layout::IntoMessage,
    };

    #[test]
    fn message_handling() {
        let mut l = MainAndStack::side_unboxed(1, 0.6, 0.1, false);

        l.handle_message(&IncMain(2).into_message());

        assert_eq!(l.max_main, 3);
    }

    #[test]
    fn main_and_stack_round_trips_through_encode_decode() {
        let l = MainAndStack::side_unboxed(2, 0.6, 0.1, true);
        let reg = registry();

        let decoded = reg.decode_one(&l.encode()).unwrap();

        assert_eq!(decoded.encode(), l.encode());
    }

    #[test]
    fn centered_main_round_trips_through_encode_decode() {
        let l = CenteredMain::horizontal_unboxed(3, 0.5, 0.05);
        let reg = registry();

        let decoded = reg.decode_one(&l.encode()).unwrap();

        assert_eq!(decoded.encode(), l.encode());
    }

    #[test]
    fn stateless_layouts_round_trip_through_the_registry() {
        let reg = registry();

        assert_eq!(reg.decode_one("Mono").unwrap().name(), "Mono");
        assert_eq!(reg.decode_one("Grid").unwrap().name(), "Grid");
    }
}
