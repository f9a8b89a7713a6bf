//! # Rendering Module
//!
//! Turns documents and session state into terminal text. The theme is an
//! explicit argument everywhere; nothing here reads configuration on its own.
//!
//! Colors follow `console`'s terminal detection, so piped output is plain.

use console::Style;
use notekeeper::config::Theme;
use notekeeper::document::{Block, BlockKind, Document, Format, Run};
use notekeeper::format::FormatCommand;
use notekeeper::lock::LockState;
use notekeeper::session::EditingSession;

use super::styles::palette;

const QUOTE_BAR: &str = "│ ";
const BULLET: &str = "• ";
const LOCK_MARKER: &str = "🔒";

pub fn render_document(doc: &Document, theme: Theme) -> String {
    let palette = palette(theme);
    let mut out = String::new();
    for block in doc.blocks() {
        let (prefix, base) = match block.kind {
            BlockKind::Paragraph => (String::new(), Style::new()),
            BlockKind::Heading1 => (String::new(), palette.heading.clone().bold()),
            BlockKind::Heading2 => (String::new(), palette.heading.clone()),
            BlockKind::Blockquote => (
                palette.quote.apply_to(QUOTE_BAR).to_string(),
                palette.quote.clone().italic(),
            ),
            BlockKind::ListItem { ordered: false, .. } => {
                (palette.marker.apply_to(BULLET).to_string(), Style::new())
            }
            BlockKind::ListItem {
                ordered: true,
                index,
            } => (
                palette.marker.apply_to(format!("{}. ", index)).to_string(),
                Style::new(),
            ),
        };
        out.push_str(&prefix);
        out.push_str(&render_runs(block, &base));
        out.push('\n');
        if matches!(block.kind, BlockKind::Heading1) {
            out.push('\n');
        }
    }
    out
}

fn render_runs(block: &Block, base: &Style) -> String {
    block.runs.iter().map(|run| render_run(run, base)).collect()
}

fn render_run(run: &Run, base: &Style) -> String {
    let mut style = base.clone();
    for format in &run.formats {
        style = match format {
            Format::Bold => style.bold(),
            Format::Italic => style.italic(),
            Format::Underline => style.underlined(),
        };
    }
    style.apply_to(&run.text).to_string()
}

/// Title line, lock state, tags and the note body (or the locked notice).
pub fn render_session(session: &EditingSession, theme: Theme) -> String {
    let palette = palette(theme);
    let mut out = String::new();

    let title = if session.title().is_empty() {
        "Untitled"
    } else {
        session.title()
    };
    out.push_str(&palette.title.apply_to(title).to_string());
    if session.lock_state() != LockState::Public {
        out.push(' ');
        out.push_str(LOCK_MARKER);
    }
    out.push('\n');

    if !session.tags().is_empty() {
        let tags: Vec<String> = session.tags().iter().map(|t| format!("#{}", t)).collect();
        out.push_str(&palette.muted.apply_to(tags.join(" ")).to_string());
        out.push('\n');
    }
    out.push_str("--------------------------------\n");

    match session.document() {
        Some(doc) => out.push_str(&render_document(doc, theme)),
        None => {
            let notice = session
                .prompt()
                .map(|p| p.message())
                .unwrap_or("This note is locked.");
            out.push_str(&palette.locked.apply_to(notice).to_string());
            out.push('\n');
        }
    }
    out
}

/// One line describing the editor state, for the `status` event.
pub fn render_status(session: &EditingSession) -> String {
    let active: Vec<&str> = FormatCommand::ALL
        .iter()
        .filter(|cmd| cmd.is_active(session.active()))
        .map(|cmd| cmd.name())
        .collect();
    let active = if active.is_empty() {
        "-".to_string()
    } else {
        active.join(",")
    };
    let saved = session.save_status().to_string();

    format!(
        "state: {} | block: {} | formats: {} | list: {} | dirty: {}{}",
        session.lock_state(),
        session.active().block_kind.label(),
        active,
        session.list_mode().label(),
        if session.is_dirty() { "yes" } else { "no" },
        if saved.is_empty() {
            String::new()
        } else {
            format!(" | {}", saved)
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use notekeeper::document::markdown::from_markdown;

    fn plain(text: &str) -> String {
        console::strip_ansi_codes(text).to_string()
    }

    #[test]
    fn renders_block_prefixes() {
        let doc = from_markdown("# Title\n\n- one\n- two\n\n1. first\n2. second\n\n> quoted");
        let out = plain(&render_document(&doc, Theme::Light));
        assert_eq!(
            out,
            "Title\n\n• one\n• two\n1. first\n2. second\n│ quoted\n"
        );
    }

    #[test]
    fn both_themes_render_the_same_text() {
        let doc = from_markdown("**bold** and *italic*");
        assert_eq!(
            plain(&render_document(&doc, Theme::Light)),
            plain(&render_document(&doc, Theme::Dark))
        );
    }

    #[test]
    fn status_of_a_new_note() {
        let session = EditingSession::new_note();
        assert_eq!(
            render_status(&session),
            "state: public | block: paragraph | formats: - | list: off | dirty: no"
        );
    }
}
