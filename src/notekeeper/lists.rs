//! # List Continuation
//!
//! Two toolbar modes keep a list going as the user presses Enter: bullet mode
//! and numbered mode. They are mutually exclusive and live in [`ListMode`].
//!
//! What a newline does is decided by [`resolve_newline`], checked in order:
//!
//! 1. An active list mode inserts the next marker (`"\n- "` or `"\nN. "`).
//! 2. Inside a structural list item, the item is split and the new block
//!    stays a list item.
//! 3. A line that starts with `- ` or `N. ` (after optional indentation) is
//!    continued with the same indentation and the next marker.
//! 4. Otherwise it is a plain newline.
//!
//! Only the first matching tier applies.

use log::debug;

use crate::document::{BlockKind, Document, Position, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    #[default]
    Off,
    Bullet,
    Ordered {
        counter: u32,
    },
}

impl ListMode {
    pub fn label(&self) -> &'static str {
        match self {
            ListMode::Off => "off",
            ListMode::Bullet => "bullet",
            ListMode::Ordered { .. } => "numbered",
        }
    }
}

/// Everything [`resolve_newline`] needs to know about the cursor.
#[derive(Debug, Clone, Copy)]
pub struct NewlineContext<'a> {
    pub mode: ListMode,
    pub block_kind: BlockKind,
    /// Text of the block holding the cursor.
    pub line: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewlineAction {
    /// Insert `text` instead of a plain newline; bump the counter if asked.
    InsertMarker { text: String, advance_counter: bool },
    /// Split the surrounding list item into a new item.
    ContinueStructural { ordered: bool },
    /// Insert `text`, which repeats the line's textual marker.
    ContinueTextual { text: String },
    Default,
}

pub fn resolve_newline(ctx: &NewlineContext<'_>) -> NewlineAction {
    match ctx.mode {
        ListMode::Bullet => {
            return NewlineAction::InsertMarker {
                text: "\n- ".to_string(),
                advance_counter: false,
            }
        }
        ListMode::Ordered { counter } => {
            return NewlineAction::InsertMarker {
                text: format!("\n{}. ", counter),
                advance_counter: true,
            }
        }
        ListMode::Off => {}
    }

    if let Some(ordered) = ctx.block_kind.list_ordering() {
        return NewlineAction::ContinueStructural { ordered };
    }

    match textual_marker(ctx.line) {
        Some(text) => NewlineAction::ContinueTextual { text },
        None => NewlineAction::Default,
    }
}

/// The newline plus marker that continues a `- ` or `N. ` line.
fn textual_marker(line: &str) -> Option<String> {
    let rest = line.trim_start();
    let indent = &line[..line.len() - rest.len()];

    if let Some(after) = rest.strip_prefix('-') {
        if after.starts_with(char::is_whitespace) {
            return Some(format!("\n{}- ", indent));
        }
    }

    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let after = rest[digits..].strip_prefix('.')?;
    if !after.starts_with(char::is_whitespace) {
        return None;
    }
    let next = rest[..digits].parse::<u64>().ok()?.checked_add(1)?;
    Some(format!("\n{}{}. ", indent, next))
}

#[derive(Debug, Default)]
pub struct ListController {
    mode: ListMode,
}

impl ListController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }

    /// Leaves any list mode without touching the text.
    pub fn exit(&mut self) {
        if self.mode != ListMode::Off {
            debug!("list mode {} -> off", self.mode.label());
        }
        self.mode = ListMode::Off;
    }

    /// Bullet button: enters bullet mode and inserts `"- "`, or leaves it.
    pub fn toggle_bullet(&mut self, doc: &mut Document, selection: &Selection) -> Selection {
        if self.mode == ListMode::Bullet {
            self.exit();
            return *selection;
        }
        debug!("list mode {} -> bullet", self.mode.label());
        self.mode = ListMode::Bullet;
        doc.insert_text(selection, "- ")
    }

    /// Numbered button: enters numbered mode and inserts `"1. "`, or leaves it.
    pub fn toggle_ordered(&mut self, doc: &mut Document, selection: &Selection) -> Selection {
        if matches!(self.mode, ListMode::Ordered { .. }) {
            self.exit();
            return *selection;
        }
        debug!("list mode {} -> numbered", self.mode.label());
        self.mode = ListMode::Ordered { counter: 2 };
        doc.insert_text(selection, "1. ")
    }

    /// Handles the Enter key and returns the new selection.
    pub fn handle_newline(&mut self, doc: &mut Document, selection: &Selection) -> Selection {
        let anchor = doc.position(&selection.anchor);
        let line = doc.line_at(&selection.anchor);
        let block_kind = doc.blocks()[anchor.block].kind;
        let action = resolve_newline(&NewlineContext {
            mode: self.mode,
            block_kind,
            line: &line,
        });

        match action {
            NewlineAction::InsertMarker {
                text,
                advance_counter,
            } => {
                if advance_counter {
                    if let ListMode::Ordered { counter } = &mut self.mode {
                        *counter = counter.saturating_add(1);
                    }
                }
                doc.insert_text(selection, &text)
            }
            NewlineAction::ContinueStructural { ordered } => {
                let restored = doc.insert_text(selection, "\n");
                let pos = doc.position(&restored.anchor);
                if doc.blocks()[pos.block].kind.list_ordering() != Some(ordered) {
                    let kind = if ordered {
                        BlockKind::ordered(1)
                    } else {
                        BlockKind::bullet()
                    };
                    return doc.set_block_kind(&restored, kind);
                }
                restored
            }
            NewlineAction::ContinueTextual { text } => doc.insert_text(selection, &text),
            NewlineAction::Default => doc.insert_text(selection, "\n"),
        }
    }
}

/// Cursor position at the end of the document.
pub fn end_of(doc: &Document) -> Selection {
    Selection::caret(doc.point(Position::new(
        doc.len().saturating_sub(1),
        doc.blocks().last().map(|b| b.len()).unwrap_or(0),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Run};

    fn ctx(mode: ListMode, block_kind: BlockKind, line: &str) -> NewlineAction {
        resolve_newline(&NewlineContext {
            mode,
            block_kind,
            line,
        })
    }

    fn lines(doc: &Document) -> Vec<String> {
        doc.blocks().iter().map(Block::text).collect()
    }

    #[test]
    fn mode_beats_structure_and_text() {
        let action = ctx(ListMode::Bullet, BlockKind::ordered(1), "1. item");
        assert_eq!(
            action,
            NewlineAction::InsertMarker {
                text: "\n- ".into(),
                advance_counter: false
            }
        );
    }

    #[test]
    fn structure_beats_text() {
        let action = ctx(ListMode::Off, BlockKind::bullet(), "1. looks numbered");
        assert_eq!(action, NewlineAction::ContinueStructural { ordered: false });
    }

    #[test]
    fn textual_markers_keep_indentation() {
        assert_eq!(
            ctx(ListMode::Off, BlockKind::Paragraph, "  - item"),
            NewlineAction::ContinueTextual {
                text: "\n  - ".into()
            }
        );
        assert_eq!(
            ctx(ListMode::Off, BlockKind::Paragraph, "9. nine"),
            NewlineAction::ContinueTextual {
                text: "\n10. ".into()
            }
        );
    }

    #[test]
    fn non_markers_fall_through() {
        for line in ["-no space", "3.no space", "plain", "", "a. b", "- "] {
            let expected = if line == "- " {
                NewlineAction::ContinueTextual { text: "\n- ".into() }
            } else {
                NewlineAction::Default
            };
            assert_eq!(ctx(ListMode::Off, BlockKind::Paragraph, line), expected, "{line:?}");
        }
    }

    #[test]
    fn ordered_mode_counts_up_on_each_newline() {
        let mut doc = Document::new();
        let mut lists = ListController::new();
        let mut sel = lists.toggle_ordered(&mut doc, &Selection::default());
        assert_eq!(lines(&doc), vec!["1. "]);

        for _ in 0..3 {
            sel = lists.handle_newline(&mut doc, &sel);
        }
        assert_eq!(lines(&doc), vec!["1. ", "2. ", "3. ", "4. "]);
        assert_eq!(lists.mode(), ListMode::Ordered { counter: 5 });
    }

    #[test]
    fn modes_are_mutually_exclusive() {
        let mut doc = Document::new();
        let mut lists = ListController::new();
        let sel = lists.toggle_bullet(&mut doc, &Selection::default());
        assert_eq!(lists.mode(), ListMode::Bullet);

        let sel = lists.toggle_ordered(&mut doc, &sel);
        assert_eq!(lists.mode(), ListMode::Ordered { counter: 2 });
        assert_eq!(lines(&doc), vec!["- 1. "]);

        // leaving a mode keeps the text and resets the counter
        let sel = lists.toggle_ordered(&mut doc, &sel);
        assert_eq!(lists.mode(), ListMode::Off);
        assert_eq!(lines(&doc), vec!["- 1. "]);
        lists.toggle_ordered(&mut doc, &sel);
        assert_eq!(lists.mode(), ListMode::Ordered { counter: 2 });
    }

    #[test]
    fn bullet_mode_inserts_markers() {
        let mut doc = Document::new();
        let mut lists = ListController::new();
        let sel = lists.toggle_bullet(&mut doc, &Selection::default());
        let sel = doc.insert_text(&sel, "eggs");
        lists.handle_newline(&mut doc, &sel);
        assert_eq!(lines(&doc), vec!["- eggs", "- "]);
    }

    #[test]
    fn structural_items_split_into_new_items() {
        let mut doc = Document::from_blocks(vec![
            Block::with_runs(BlockKind::ordered(1), vec![Run::plain("one")]),
            Block::with_runs(BlockKind::ordered(2), vec![Run::plain("two")]),
        ]);
        let mut lists = ListController::new();
        let sel = Selection::caret(doc.point(Position::new(0, 3)));
        let sel = lists.handle_newline(&mut doc, &sel);
        assert_eq!(doc.position(&sel.anchor), Position::new(1, 0));
        assert_eq!(doc.blocks()[1].kind, BlockKind::ordered(2));
        assert_eq!(doc.blocks()[2].kind, BlockKind::ordered(3));
    }

    #[test]
    fn textual_lines_continue_without_a_mode() {
        let mut doc = Document::from_plain_text("7. seven");
        let mut lists = ListController::new();
        let end = end_of(&doc);
        let sel = lists.handle_newline(&mut doc, &end);
        doc.insert_text(&sel, "eight");
        assert_eq!(lines(&doc), vec!["7. seven", "8. eight"]);
        assert_eq!(lists.mode(), ListMode::Off);
    }

    #[test]
    fn plain_lines_get_a_plain_newline() {
        let mut doc = Document::from_plain_text("hello");
        let mut lists = ListController::new();
        let end = end_of(&doc);
        lists.handle_newline(&mut doc, &end);
        assert_eq!(lines(&doc), vec!["hello", ""]);
    }
}
