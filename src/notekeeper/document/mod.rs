//! # Document Model
//!
//! A note's content is an owned [`Document`]: an ordered list of [`Block`]s,
//! each holding an ordered list of [`Run`]s. A run is a span of text that
//! shares one [`FormatSet`].
//!
//! ```text
//! Document
//! ├── Block { kind: Heading1, runs: ["Groceries" {Bold}] }
//! ├── Block { kind: ListItem { ordered: true, index: 1 }, runs: ["eggs"] }
//! └── Block { kind: ListItem { ordered: true, index: 2 }, runs: ["milk", " (oat)" {Italic}] }
//! ```
//!
//! ## Invariants
//!
//! - A document always has at least one block, and every block at least one run.
//! - A run's text is empty only when it is the sole run of its block (the
//!   placeholder that carries formatting for text typed into an empty block).
//! - Adjacent runs never share the same format set; they are merged.
//! - `ListItem.index` increases by one along each contiguous run of list
//!   blocks with the same ordering (see [`Document::renumber_lists`]).
//!
//! Offsets are counted in `char`s, never bytes.
//!
//! The editing operations live in [`edit`], the cursor types in
//! [`selection`], and the text form stored in notes in [`markdown`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod edit;
pub mod markdown;
pub mod selection;

pub use edit::ActiveState;
pub use selection::{Point, Position, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Format {
    Bold,
    Italic,
    Underline,
}

pub type FormatSet = BTreeSet<Format>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BlockKind {
    #[default]
    Paragraph,
    Heading1,
    Heading2,
    Blockquote,
    ListItem {
        ordered: bool,
        index: u32,
    },
}

impl BlockKind {
    pub fn bullet() -> Self {
        BlockKind::ListItem {
            ordered: false,
            index: 1,
        }
    }

    pub fn ordered(index: u32) -> Self {
        BlockKind::ListItem {
            ordered: true,
            index,
        }
    }

    /// Compares kinds ignoring list numbering.
    pub fn same_kind(&self, other: &BlockKind) -> bool {
        match (self, other) {
            (
                BlockKind::ListItem { ordered: a, .. },
                BlockKind::ListItem { ordered: b, .. },
            ) => a == b,
            _ => self == other,
        }
    }

    pub fn list_ordering(&self) -> Option<bool> {
        match self {
            BlockKind::ListItem { ordered, .. } => Some(*ordered),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading1 => "heading 1",
            BlockKind::Heading2 => "heading 2",
            BlockKind::Blockquote => "quote",
            BlockKind::ListItem { ordered: false, .. } => "bullet item",
            BlockKind::ListItem { ordered: true, .. } => "numbered item",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub formats: FormatSet,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            formats: FormatSet::new(),
        }
    }

    pub fn styled(text: impl Into<String>, formats: &[Format]) -> Self {
        Self {
            text: text.into(),
            formats: formats.iter().copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Cuts the text at a char offset, keeping the head and returning the tail.
    fn split_text(&mut self, at: usize) -> String {
        let byte = byte_index(&self.text, at);
        self.text.split_off(byte)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<Run>,
}

impl Default for Block {
    fn default() -> Self {
        Self::new(BlockKind::Paragraph)
    }
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            runs: vec![Run::default()],
        }
    }

    pub fn with_runs(kind: BlockKind, runs: Vec<Run>) -> Self {
        let mut block = Self { kind, runs };
        block.normalize();
        block
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::with_runs(BlockKind::Paragraph, vec![Run::plain(text)])
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.runs.iter().map(Run::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(Run::is_empty)
    }

    /// Formats of the run a char offset resolves to.
    pub fn formats_at(&self, offset: usize) -> FormatSet {
        let (run, _) = self.locate(offset);
        self.runs[run].formats.clone()
    }

    /// Resolves a char offset to `(run index, offset in run)`.
    ///
    /// An offset on the boundary between two runs belongs to the earlier one,
    /// so typing at the end of a bold word continues in bold.
    pub(crate) fn locate(&self, offset: usize) -> (usize, usize) {
        let mut acc = 0;
        for (i, run) in self.runs.iter().enumerate() {
            let len = run.len();
            if offset <= acc + len {
                return (i, offset - acc);
            }
            acc += len;
        }
        let last = self.runs.len().saturating_sub(1);
        (last, self.runs.get(last).map(Run::len).unwrap_or(0))
    }

    /// Char offset of a `(run, offset in run)` pair, clamped to the block.
    pub(crate) fn offset_of(&self, run: usize, offset: usize) -> usize {
        let run = run.min(self.runs.len().saturating_sub(1));
        let before: usize = self.runs[..run].iter().map(Run::len).sum();
        before + offset.min(self.runs.get(run).map(Run::len).unwrap_or(0))
    }

    /// Makes sure a run starts at `offset` and returns that run's index.
    pub(crate) fn boundary(&mut self, offset: usize) -> usize {
        let mut acc = 0;
        for i in 0..self.runs.len() {
            if offset <= acc {
                return i;
            }
            let len = self.runs[i].len();
            if offset < acc + len {
                let tail = self.runs[i].split_text(offset - acc);
                let formats = self.runs[i].formats.clone();
                self.runs.insert(i + 1, Run { text: tail, formats });
                return i + 1;
            }
            acc += len;
        }
        self.runs.len()
    }

    /// Splits the block at `offset`, returning the runs after it.
    pub(crate) fn split_off(&mut self, offset: usize) -> Vec<Run> {
        let at = self.boundary(offset);
        self.runs.split_off(at)
    }

    /// Drops empty runs and merges neighbours with equal formats.
    pub fn normalize(&mut self) {
        let placeholder = self
            .runs
            .first()
            .map(|r| r.formats.clone())
            .unwrap_or_default();

        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.formats == run.formats => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        if merged.is_empty() {
            merged.push(Run {
                text: String::new(),
                formats: placeholder,
            });
        }
        self.runs = merged;
    }

    /// Appends text at the end of the block in the given formats.
    pub(crate) fn push_text(&mut self, text: &str, formats: &FormatSet) {
        if text.is_empty() {
            return;
        }
        if self.is_empty() {
            self.runs = vec![Run {
                text: text.to_string(),
                formats: formats.clone(),
            }];
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.formats == *formats => last.text.push_str(text),
            _ => self.runs.push(Run {
                text: text.to_string(),
                formats: formats.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            blocks: vec![Block::default()],
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self { blocks };
        if doc.blocks.is_empty() {
            doc.blocks.push(Block::default());
        }
        for block in &mut doc.blocks {
            block.normalize();
        }
        doc.renumber_lists();
        doc
    }

    /// One paragraph per line of `text`.
    pub fn from_plain_text(text: &str) -> Self {
        Self::from_blocks(text.split('\n').map(Block::paragraph).collect())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True for a document holding nothing but one empty paragraph.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 1
            && self.blocks[0].kind == BlockKind::Paragraph
            && self.blocks[0].is_empty()
    }

    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renumbers list items so each contiguous list counts up by one.
    ///
    /// The first item of a list keeps its own number, so a list that was
    /// written starting at 3 stays that way.
    pub fn renumber_lists(&mut self) {
        let mut previous: Option<(bool, u32)> = None;
        for block in &mut self.blocks {
            match &mut block.kind {
                BlockKind::ListItem { ordered, index } => {
                    let next = match previous {
                        Some((prev_ordered, prev_index)) if prev_ordered == *ordered => {
                            prev_index + 1
                        }
                        _ => (*index).max(1),
                    };
                    *index = next;
                    previous = Some((*ordered, next));
                }
                _ => previous = None,
            }
        }
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }
}

/// Byte index of the `at`-th char, or the string length past the end.
pub(crate) fn byte_index(text: &str, at: usize) -> usize {
    text.char_indices()
        .nth(at)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
