use chrono::{DateTime, Utc};
use colored::Colorize;
use notekeeper::api::NoteSummary;
use notekeeper::messages::{MessageLevel, Notification};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const LOCK_MARKER: &str = "🔒";

pub(super) fn print_notifications(notifications: &[Notification]) {
    for notification in notifications {
        let content = notification.content.as_str();
        match notification.level {
            MessageLevel::Info => println!("{}", content.dimmed()),
            MessageLevel::Success => println!("{}", content.green()),
            MessageLevel::Warning => println!("{}", content.yellow()),
            MessageLevel::Error => println!("{}", content.red()),
        }
    }
}

pub(super) fn print_notes(notes: &[NoteSummary]) {
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }
    for note in notes {
        println!("{}", format_note_line(note));
    }
}

fn format_note_line(note: &NoteSummary) -> String {
    let idx_str = format!("{:>3}. ", note.index);
    let right_suffix = if note.is_private {
        format!(" {} ", LOCK_MARKER)
    } else {
        "  ".to_string()
    };

    let mut line = note.title.clone();
    if let Some(preview) = note.preview.as_deref().filter(|p| !p.is_empty()) {
        line.push_str("  ");
        line.push_str(preview);
    }
    if !note.tags.is_empty() {
        let tags: Vec<String> = note.tags.iter().map(|t| format!("#{}", t)).collect();
        line.push_str("  ");
        line.push_str(&tags.join(" "));
    }

    let fixed_width = idx_str.width() + right_suffix.width() + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed_width);
    let display = truncate_to_width(&line, available);
    let padding = available.saturating_sub(display.width());

    format!(
        "{}{}{}{}{}",
        idx_str.yellow(),
        display,
        " ".repeat(padding),
        right_suffix,
        format_time_ago(note.updated_at).dimmed()
    )
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notekeeper::model::NoteId;

    #[test]
    fn truncates_wide_text() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        assert_eq!(truncate_to_width("日本語のテキスト", 7), "日本語…");
    }

    #[test]
    fn private_lines_show_the_lock_and_no_preview() {
        colored::control::set_override(false);
        let note = NoteSummary {
            index: 2,
            id: NoteId::new("x"),
            title: "Diary".into(),
            preview: None,
            tags: Vec::new(),
            is_private: true,
            updated_at: Utc::now(),
        };
        let line = format_note_line(&note);
        assert!(line.starts_with("  2. Diary"));
        assert!(line.contains(LOCK_MARKER));
        assert!(line.trim_end().ends_with("ago") || line.trim_end().ends_with("now"));
    }
}
