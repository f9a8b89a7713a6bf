//! # Formatting Engine
//!
//! Toolbar and shortcut commands applied at the current selection. Inline
//! commands flip one [`Format`]; block commands flip a [`BlockKind`].
//!
//! Turning a heading or quote on also turns its companion format on for the
//! whole block (headings get Bold, quotes get Italic). Turning the block kind
//! off only resets the kind to Paragraph: the companion format stays until it
//! is toggled off on its own.
//!
//! After every toggle the engine re-reads the [`ActiveState`] at the restored
//! selection, so what the toolbar shows always matches the document.
//!
//! An inline toggle at a caret inside existing text changes nothing yet: the
//! engine keeps the resulting format set as *pending* for that caret, reports
//! it as active, and the next typed text takes it. Moving the caret drops it.

use log::debug;
use std::fmt;
use std::str::FromStr;

use crate::document::{ActiveState, BlockKind, Document, Format, FormatSet, Position, Selection};
use crate::error::NoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    Heading1,
    Heading2,
    Blockquote,
}

impl FormatCommand {
    pub const ALL: [FormatCommand; 6] = [
        FormatCommand::Bold,
        FormatCommand::Italic,
        FormatCommand::Underline,
        FormatCommand::Heading1,
        FormatCommand::Heading2,
        FormatCommand::Blockquote,
    ];

    /// Keyboard shortcuts: `ctrl+b`, `ctrl+i` and `ctrl+u` (or `cmd+`).
    pub fn from_shortcut(keys: &str) -> Option<Self> {
        let keys = keys.to_ascii_lowercase();
        let (modifier, key) = keys.split_once('+')?;
        if modifier != "ctrl" && modifier != "cmd" {
            return None;
        }
        match key {
            "b" => Some(FormatCommand::Bold),
            "i" => Some(FormatCommand::Italic),
            "u" => Some(FormatCommand::Underline),
            _ => None,
        }
    }

    pub fn inline_format(self) -> Option<Format> {
        match self {
            FormatCommand::Bold => Some(Format::Bold),
            FormatCommand::Italic => Some(Format::Italic),
            FormatCommand::Underline => Some(Format::Underline),
            _ => None,
        }
    }

    pub fn block_kind(self) -> Option<BlockKind> {
        match self {
            FormatCommand::Heading1 => Some(BlockKind::Heading1),
            FormatCommand::Heading2 => Some(BlockKind::Heading2),
            FormatCommand::Blockquote => Some(BlockKind::Blockquote),
            _ => None,
        }
    }

    /// Whether the command shows as active for the given toolbar state.
    pub fn is_active(self, state: &ActiveState) -> bool {
        match (self.inline_format(), self.block_kind()) {
            (Some(format), _) => state.has(format),
            (_, Some(kind)) => state.block_kind.same_kind(&kind),
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FormatCommand::Bold => "bold",
            FormatCommand::Italic => "italic",
            FormatCommand::Underline => "underline",
            FormatCommand::Heading1 => "h1",
            FormatCommand::Heading2 => "h2",
            FormatCommand::Blockquote => "quote",
        }
    }
}

impl fmt::Display for FormatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatCommand {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bold" | "b" => Ok(FormatCommand::Bold),
            "italic" | "i" => Ok(FormatCommand::Italic),
            "underline" | "u" => Ok(FormatCommand::Underline),
            "h1" | "heading1" => Ok(FormatCommand::Heading1),
            "h2" | "heading2" => Ok(FormatCommand::Heading2),
            "quote" | "blockquote" => Ok(FormatCommand::Blockquote),
            other => Self::from_shortcut(other)
                .ok_or_else(|| NoteError::validation(format!("Unknown format: {}", other))),
        }
    }
}

/// Inline format forced on when a block kind is switched on.
pub fn companion_format(kind: BlockKind) -> Option<Format> {
    match kind {
        BlockKind::Heading1 | BlockKind::Heading2 => Some(Format::Bold),
        BlockKind::Blockquote => Some(Format::Italic),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct FormattingEngine {
    active: ActiveState,
    pending: Option<(Position, FormatSet)>,
}

impl FormattingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &ActiveState {
        &self.active
    }

    /// Re-reads the active state; a pending set survives only at its own caret.
    pub fn refresh(&mut self, doc: &Document, selection: &Selection) {
        self.active = doc.query_active_state(selection);
        let caret = collapsed_at(doc, selection);
        if !matches!(&self.pending, Some((at, _)) if Some(*at) == caret) {
            self.pending = None;
        }
        if let Some((_, formats)) = &self.pending {
            self.active.formats = formats.clone();
        }
    }

    pub fn reset(&mut self) {
        self.active = ActiveState::default();
        self.pending = None;
    }

    /// Formats the next typed text must carry, if a caret toggle is waiting.
    pub fn take_pending(&mut self, doc: &Document, selection: &Selection) -> Option<FormatSet> {
        match self.pending.take() {
            Some((at, formats)) if Some(at) == collapsed_at(doc, selection) => Some(formats),
            _ => None,
        }
    }

    /// Applies a command and returns the selection to restore.
    pub fn toggle(
        &mut self,
        doc: &mut Document,
        selection: &Selection,
        command: FormatCommand,
    ) -> Selection {
        self.refresh(doc, selection);
        let before = self.active.clone();

        if let Some(format) = command.inline_format() {
            let enable = !before.has(format);
            debug!("toggle {} -> {}", command, enable);
            if let Some(caret) = collapsed_at(doc, selection) {
                if !doc.blocks()[caret.block].is_empty() {
                    let mut formats = before.formats.clone();
                    if enable {
                        formats.insert(format);
                    } else {
                        formats.remove(&format);
                    }
                    self.pending = Some((caret, formats));
                    self.refresh(doc, selection);
                    return *selection;
                }
            }
            let restored = doc.apply_format(selection, format, enable);
            self.refresh(doc, &restored);
            return restored;
        }

        self.pending = None;
        let restored = match command.block_kind() {
            Some(kind) => toggle_block(doc, selection, &before, kind),
            None => *selection,
        };
        self.refresh(doc, &restored);
        restored
    }
}

fn collapsed_at(doc: &Document, selection: &Selection) -> Option<Position> {
    let (start, end) = doc.span(selection);
    (start == end).then_some(start)
}

fn toggle_block(
    doc: &mut Document,
    selection: &Selection,
    before: &ActiveState,
    kind: BlockKind,
) -> Selection {
    if before.block_kind.same_kind(&kind) {
        debug!("block {} off", kind.label());
        return doc.set_block_kind(selection, BlockKind::Paragraph);
    }

    debug!("block {} on", kind.label());
    let restored = doc.set_block_kind(selection, kind);
    match companion_format(kind) {
        Some(format) => doc.apply_format_to_blocks(&restored, format, true),
        None => restored,
    }
}
