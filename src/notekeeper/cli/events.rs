//! # Editing Events
//!
//! `notekeeper edit` reads one event per line from stdin, standing in for the
//! keyboard, toolbar and dialogs of a graphical editor:
//!
//! ```text
//! title Groceries          # set the title
//! h1                       # toolbar button (also: bold, italic, underline, h2, quote)
//! ctrl+b                   # keyboard shortcut
//! type Shopping list       # insert text at the cursor (\n inserts a newline)
//! enter                    # the Enter key, with list continuation
//! bullet | numbered        # list buttons
//! select 0 2 0 5           # block/offset of anchor and optional focus
//! select-all | delete
//! tag work | untag work | poptag
//! private abcd abcd        # set a password (password, confirmation)
//! lock | unlock abcd
//! public                   # lock and ask for the password to make public
//! password abcd            # answer the open password prompt
//! make-public abcd | cancel
//! save | show | status | close
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use notekeeper::document::Position;
use notekeeper::error::{NoteError, Result};
use notekeeper::format::FormatCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Title(String),
    Type(String),
    Enter,
    Format(FormatCommand),
    Bullet,
    Numbered,
    Select {
        anchor: Position,
        focus: Option<Position>,
    },
    SelectAll,
    Delete,
    Tag(String),
    Untag(String),
    PopTag,
    Private { password: String, confirm: String },
    Lock,
    Unlock(String),
    Public,
    MakePublic(String),
    Password { input: String, confirm: String },
    Cancel,
    Save,
    Show,
    Status,
    Close,
}

/// Parses one script line; `None` for blank lines and comments.
pub fn parse_event(line: &str) -> Result<Option<Event>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (name, rest) = match trimmed.split_once(' ') {
        Some((name, rest)) => (name, rest),
        None => (trimmed, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let event = match name.to_ascii_lowercase().as_str() {
        "title" => Event::Title(rest.to_string()),
        "type" => Event::Type(unescape(rest)),
        "enter" => Event::Enter,
        "bullet" => Event::Bullet,
        "numbered" => Event::Numbered,
        "select" => parse_select(&args)?,
        "select-all" => Event::SelectAll,
        "delete" => Event::Delete,
        "tag" => Event::Tag(required(rest, "tag")?),
        "untag" => Event::Untag(required(rest, "untag")?),
        "poptag" => Event::PopTag,
        "private" => Event::Private {
            password: arg(&args, 0),
            confirm: arg(&args, 1),
        },
        "lock" => Event::Lock,
        "unlock" => Event::Unlock(arg(&args, 0)),
        "public" => Event::Public,
        "make-public" => Event::MakePublic(arg(&args, 0)),
        "password" => Event::Password {
            input: arg(&args, 0),
            confirm: arg(&args, 1),
        },
        "cancel" => Event::Cancel,
        "save" => Event::Save,
        "show" => Event::Show,
        "status" => Event::Status,
        "close" => Event::Close,
        other => match other.parse::<FormatCommand>() {
            Ok(command) => Event::Format(command),
            Err(_) => {
                return Err(NoteError::validation(format!("Unknown event: {}", name)));
            }
        },
    };
    Ok(Some(event))
}

fn arg(args: &[&str], n: usize) -> String {
    args.get(n).map(|a| a.to_string()).unwrap_or_default()
}

fn required(rest: &str, event: &str) -> Result<String> {
    let value = rest.trim();
    if value.is_empty() {
        return Err(NoteError::validation(format!("'{}' needs a value", event)));
    }
    Ok(value.to_string())
}

fn parse_select(args: &[&str]) -> Result<Event> {
    let numbers = args
        .iter()
        .map(|a| a.parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| NoteError::validation("select takes block and offset numbers"))?;
    match numbers.as_slice() {
        [block, offset] => Ok(Event::Select {
            anchor: Position::new(*block, *offset),
            focus: None,
        }),
        [block, offset, focus_block, focus_offset] => Ok(Event::Select {
            anchor: Position::new(*block, *offset),
            focus: Some(Position::new(*focus_block, *focus_offset)),
        }),
        _ => Err(NoteError::validation(
            "select takes 'block offset' or 'block offset block offset'",
        )),
    }
}

/// `\n` becomes a newline, `\\` a backslash.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(line: &str) -> Event {
        parse_event(line).unwrap().unwrap()
    }

    #[test]
    fn type_keeps_spacing_and_unescapes() {
        assert_eq!(event("type  two  spaces"), Event::Type(" two  spaces".into()));
        assert_eq!(event(r"type a\nb\\c"), Event::Type("a\nb\\c".into()));
    }

    #[test]
    fn toolbar_and_shortcuts() {
        assert_eq!(event("bold"), Event::Format(FormatCommand::Bold));
        assert_eq!(event("ctrl+i"), Event::Format(FormatCommand::Italic));
        assert_eq!(event("H1"), Event::Format(FormatCommand::Heading1));
        assert_eq!(event("quote"), Event::Format(FormatCommand::Blockquote));
    }

    #[test]
    fn password_events() {
        assert_eq!(
            event("private abcd abcd"),
            Event::Private {
                password: "abcd".into(),
                confirm: "abcd".into()
            }
        );
        assert_eq!(event("unlock"), Event::Unlock(String::new()));
        assert_eq!(
            event("password abcd"),
            Event::Password {
                input: "abcd".into(),
                confirm: String::new()
            }
        );
    }

    #[test]
    fn select_forms() {
        assert_eq!(
            event("select 1 3"),
            Event::Select {
                anchor: Position::new(1, 3),
                focus: None
            }
        );
        assert!(parse_event("select 1").is_err());
        assert!(parse_event("select a b").is_err());
    }

    #[test]
    fn comments_blank_and_unknown() {
        assert_eq!(parse_event("   ").unwrap(), None);
        assert_eq!(parse_event("# note").unwrap(), None);
        assert!(parse_event("frobnicate").is_err());
        assert!(parse_event("tag").is_err());
    }
}
