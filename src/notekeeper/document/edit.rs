//! Pure transformations of a [`Document`].
//!
//! Each operation takes the selection it acts on and returns the selection to
//! restore afterwards. Nothing here knows about rendering or input devices.

use super::{Block, BlockKind, Document, Format, FormatSet, Point, Position, Run, Selection};

/// What the toolbar shows as active: evaluated at the anchor point only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveState {
    pub formats: FormatSet,
    pub block_kind: BlockKind,
}

impl ActiveState {
    pub fn has(&self, format: Format) -> bool {
        self.formats.contains(&format)
    }
}

impl Document {
    /// Inserts text at the selection, replacing a range if one is selected.
    ///
    /// Every `\n` splits the current block; the caret ends up after the
    /// inserted text.
    pub fn insert_text(&mut self, selection: &Selection, text: &str) -> Selection {
        let (start, end) = self.span(selection);
        let mut pos = if start != end {
            self.delete_range(start, end)
        } else {
            start
        };

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                pos = self.split_block(pos);
            }
            pos = self.insert_plain(pos, line);
        }
        Selection::caret(self.point(pos))
    }

    /// Deletes the selected range; a collapsed selection is left as is.
    pub fn delete_selection(&mut self, selection: &Selection) -> Selection {
        let (start, end) = self.span(selection);
        let pos = self.delete_range(start, end);
        Selection::caret(self.point(pos))
    }

    /// Inserts text that carries exactly `formats`, whatever runs it lands in.
    pub fn insert_styled(&mut self, selection: &Selection, text: &str, formats: &FormatSet) -> Selection {
        let (start, _) = self.span(selection);
        let caret = self.insert_text(selection, text);
        let end = self.position(&caret.anchor);
        self.map_range(start, end, |set| *set = formats.clone());
        Selection::caret(self.point(end))
    }

    /// Sets or clears an inline format over the selection.
    ///
    /// A collapsed selection only changes an empty block, whose placeholder
    /// run carries the formatting of the text typed next. Anywhere else a
    /// caret toggle is held by the [`FormattingEngine`](crate::format::FormattingEngine)
    /// until the next keystroke.
    pub fn apply_format(&mut self, selection: &Selection, format: Format, enable: bool) -> Selection {
        let anchor = self.position(&selection.anchor);
        let focus = selection.focus.map(|f| self.position(&f));
        let (start, end) = self.span(selection);

        if start != end {
            self.map_range(start, end, |formats| set_format(formats, format, enable));
        } else {
            let block = &mut self.blocks_mut()[anchor.block];
            if block.is_empty() {
                for run in &mut block.runs {
                    set_format(&mut run.formats, format, enable);
                }
                block.normalize();
            }
        }

        self.restore(anchor, focus)
    }

    /// Sets the formatting on every run of every block the selection touches.
    pub fn apply_format_to_blocks(
        &mut self,
        selection: &Selection,
        format: Format,
        enable: bool,
    ) -> Selection {
        let anchor = self.position(&selection.anchor);
        let focus = selection.focus.map(|f| self.position(&f));
        let (start, end) = self.span(selection);

        for block in &mut self.blocks_mut()[start.block..=end.block] {
            for run in &mut block.runs {
                set_format(&mut run.formats, format, enable);
            }
            block.normalize();
        }
        self.restore(anchor, focus)
    }

    /// Changes the kind of every block the selection touches.
    pub fn set_block_kind(&mut self, selection: &Selection, kind: BlockKind) -> Selection {
        let anchor = self.position(&selection.anchor);
        let focus = selection.focus.map(|f| self.position(&f));
        let (start, end) = self.span(selection);

        for block in &mut self.blocks_mut()[start.block..=end.block] {
            block.kind = kind;
        }
        self.renumber_lists();
        self.restore(anchor, focus)
    }

    /// Formats and block kind at the anchor point.
    pub fn query_active_state(&self, selection: &Selection) -> ActiveState {
        let pos = self.position(&selection.anchor);
        let block = &self.blocks()[pos.block];
        ActiveState {
            formats: block.formats_at(pos.offset),
            block_kind: block.kind,
        }
    }

    /// Text of the block holding the anchor.
    pub fn line_at(&self, point: &Point) -> String {
        let pos = self.position(point);
        self.blocks()[pos.block].text()
    }

    fn insert_plain(&mut self, pos: Position, text: &str) -> Position {
        if text.is_empty() {
            return pos;
        }
        let block = &mut self.blocks_mut()[pos.block];
        let (run, offset) = block.locate(pos.offset);
        let target = &mut block.runs[run].text;
        let byte = super::byte_index(target, offset);
        target.insert_str(byte, text);
        Position::new(pos.block, pos.offset + text.chars().count())
    }

    /// Splits a block in two at `pos` and returns the start of the new block.
    ///
    /// List items and quotes continue as the same kind; headings are followed
    /// by a paragraph. Formatting at the split point carries over.
    pub(crate) fn split_block(&mut self, pos: Position) -> Position {
        let blocks = self.blocks_mut();
        let carried = blocks[pos.block].formats_at(pos.offset);
        let tail = blocks[pos.block].split_off(pos.offset);

        let head = &mut blocks[pos.block];
        if head.runs.is_empty() {
            head.runs.push(Run {
                text: String::new(),
                formats: carried.clone(),
            });
        }
        head.normalize();

        let kind = match head.kind {
            BlockKind::Heading1 | BlockKind::Heading2 => BlockKind::Paragraph,
            other => other,
        };
        let mut next = Block { kind, runs: tail };
        if next.runs.iter().all(Run::is_empty) {
            next.runs = vec![Run {
                text: String::new(),
                formats: carried,
            }];
        }
        next.normalize();

        blocks.insert(pos.block + 1, next);
        self.renumber_lists();
        Position::new(pos.block + 1, 0)
    }

    /// Removes the text between two ordered positions, joining blocks.
    pub(crate) fn delete_range(&mut self, start: Position, end: Position) -> Position {
        if start >= end {
            return start;
        }
        let blocks = self.blocks_mut();
        if start.block == end.block {
            let block = &mut blocks[start.block];
            let tail = block.split_off(end.offset);
            block.split_off(start.offset);
            block.runs.extend(tail);
            block.normalize();
        } else {
            let tail = blocks[end.block].split_off(end.offset);
            blocks.drain(start.block + 1..=end.block);
            let block = &mut blocks[start.block];
            block.split_off(start.offset);
            block.runs.extend(tail);
            block.normalize();
            self.renumber_lists();
        }
        start
    }

    /// Rewrites the format set of every run between two ordered positions.
    fn map_range(&mut self, start: Position, end: Position, mut f: impl FnMut(&mut FormatSet)) {
        for b in start.block..=end.block {
            let block = &mut self.blocks_mut()[b];
            let from = if b == start.block { start.offset } else { 0 };
            let to = if b == end.block { end.offset } else { block.len() };
            if from >= to {
                continue;
            }
            let first = block.boundary(from);
            let last = block.boundary(to);
            for run in &mut block.runs[first..last] {
                f(&mut run.formats);
            }
            block.normalize();
        }
    }

    fn restore(&self, anchor: Position, focus: Option<Position>) -> Selection {
        Selection {
            anchor: self.point(anchor),
            focus: focus.map(|f| self.point(f)),
        }
    }
}

fn set_format(formats: &mut FormatSet, format: Format, enable: bool) {
    if enable {
        formats.insert(format);
    } else {
        formats.remove(&format);
    }
}
