//! Cursor and range references into a [`Document`].
//!
//! A [`Point`] addresses `(block, run, offset-in-run)`, which is what the
//! toolbar query and the adapter work with. Edits are done on [`Position`]s,
//! `(block, offset-in-block)`, which survive run splits and merges; every
//! mutation converts the selection to positions first and back afterwards,
//! so the cursor is restored rather than lost.

use serde::{Deserialize, Serialize};

use super::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub block: usize,
    pub run: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, run: usize, offset: usize) -> Self {
        Self { block, run, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// An anchor point, optionally extended to a focus point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Option<Point>,
}

impl Selection {
    pub fn caret(point: Point) -> Self {
        Self {
            anchor: point,
            focus: None,
        }
    }

    pub fn range(anchor: Point, focus: Point) -> Self {
        Self {
            anchor,
            focus: Some(focus),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.focus.map_or(true, |focus| focus == self.anchor)
    }

    pub fn focus_or_anchor(&self) -> Point {
        self.focus.unwrap_or(self.anchor)
    }
}

impl Document {
    /// Resolves a point to a block-level position, clamping out-of-range parts.
    pub fn position(&self, point: &Point) -> Position {
        let block = point.block.min(self.blocks().len().saturating_sub(1));
        let offset = self.blocks()[block].offset_of(point.run, point.offset);
        Position { block, offset }
    }

    pub fn point(&self, position: Position) -> Point {
        let block = position.block.min(self.blocks().len().saturating_sub(1));
        let (run, offset) = self.blocks()[block].locate(position.offset);
        Point { block, run, offset }
    }

    /// Anchor and focus as ordered positions `(start, end)`.
    pub fn span(&self, selection: &Selection) -> (Position, Position) {
        let anchor = self.position(&selection.anchor);
        let focus = self.position(&selection.focus_or_anchor());
        if focus < anchor {
            (focus, anchor)
        } else {
            (anchor, focus)
        }
    }

    pub fn start_point(&self) -> Point {
        Point::default()
    }

    pub fn end_point(&self) -> Point {
        let block = self.blocks().len().saturating_sub(1);
        let len = self.blocks()[block].len();
        self.point(Position::new(block, len))
    }

    /// Re-resolves a selection after the document changed under it.
    pub fn clamp_selection(&self, selection: &Selection) -> Selection {
        let anchor = self.point(self.position(&selection.anchor));
        let focus = selection
            .focus
            .map(|focus| self.point(self.position(&focus)));
        Selection { anchor, focus }
    }

    /// Selection covering the whole document.
    pub fn select_all(&self) -> Selection {
        Selection::range(self.start_point(), self.end_point())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, BlockKind, Format, Run};

    fn doc() -> Document {
        Document::from_blocks(vec![
            Block::with_runs(
                BlockKind::Paragraph,
                vec![Run::plain("ab"), Run::styled("cd", &[Format::Bold])],
            ),
            Block::paragraph("efg"),
        ])
    }

    #[test]
    fn points_and_positions_convert_both_ways() {
        let doc = doc();
        let pos = doc.position(&Point::new(0, 1, 1));
        assert_eq!(pos, Position::new(0, 3));
        assert_eq!(doc.point(pos), Point::new(0, 1, 1));
    }

    #[test]
    fn out_of_range_points_are_clamped() {
        let doc = doc();
        assert_eq!(doc.position(&Point::new(9, 9, 9)), Position::new(1, 3));
        assert_eq!(doc.end_point(), Point::new(1, 0, 3));
    }

    #[test]
    fn span_orders_backwards_selections() {
        let doc = doc();
        let sel = Selection::range(Point::new(1, 0, 1), Point::new(0, 0, 1));
        let (start, end) = doc.span(&sel);
        assert_eq!(start, Position::new(0, 1));
        assert_eq!(end, Position::new(1, 1));
    }

    #[test]
    fn collapsed_detection() {
        let p = Point::new(0, 0, 1);
        assert!(Selection::caret(p).is_collapsed());
        assert!(Selection::range(p, p).is_collapsed());
        assert!(!Selection::range(p, Point::new(0, 0, 2)).is_collapsed());
    }
}
