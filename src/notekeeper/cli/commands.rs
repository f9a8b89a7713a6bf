//! # CLI Layer
//!
//! This module is **one possible UI client** for notekeeper. It is the only
//! place that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Parses arguments
//! - Formats output for humans
//!
//! `edit` is the rendering/input adapter of an editing session: it forwards
//! the events it reads from stdin to the session and prints whatever the
//! session reports back. It holds no editing state of its own.

use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use directories::ProjectDirs;
use env_logger::Env;
use log::{debug, LevelFilter};
use notekeeper::api::{Navigation, NotesApi};
use notekeeper::config::NotekeeperConfig;
use notekeeper::document::Selection;
use notekeeper::error::{NoteError, Result};
use notekeeper::session::EditingSession;
use notekeeper::store::fs::FileStore;

use super::events::{parse_event, Event};
use super::print::{print_notes, print_notifications};
use super::render::{render_session, render_status};
use super::setup::{Cli, Commands};

const HOME_ENV: &str = "NOTEKEEPER_HOME";
const LOG_ENV: &str = "NOTEKEEPER_LOG";

struct AppContext {
    api: NotesApi<FileStore>,
    config: NotekeeperConfig,
    data_dir: PathBuf,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context()?;

    match cli.command {
        Some(Commands::List { search }) => handle_list(&ctx, search),
        Some(Commands::View { note, password }) => handle_view(&ctx, &note, password),
        Some(Commands::Edit { note }) => handle_edit(&mut ctx, note),
        Some(Commands::Delete { note }) => handle_delete(&mut ctx, &note),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        None => handle_list(&ctx, None),
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().filter_or(LOG_ENV, "warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "notekeeper", "notekeeper")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| NoteError::Store("Could not determine data directory".to_string()))
}

fn init_context() -> Result<AppContext> {
    let data_dir = data_dir()?;
    let config = NotekeeperConfig::load(&data_dir)?;
    let store = FileStore::open(&data_dir)?.with_file_ext(&config.file_ext);
    debug!("using data directory {}", data_dir.display());

    Ok(AppContext {
        api: NotesApi::new(store),
        config,
        data_dir,
    })
}

fn handle_list(ctx: &AppContext, search: Option<String>) -> Result<()> {
    let notes = ctx.api.list_notes(search.as_deref())?;
    print_notes(&notes);
    Ok(())
}

fn handle_view(ctx: &AppContext, note: &str, password: Option<String>) -> Result<()> {
    let mut session = ctx.api.open(note)?;
    if let Some(password) = password {
        if session.is_locked() {
            ctx.api.unlock(&mut session, &password)?;
        }
    }
    print!("{}", render_session(&session, ctx.config.theme));
    Ok(())
}

fn handle_edit(ctx: &mut AppContext, note: Option<String>) -> Result<()> {
    let mut session = match note {
        Some(note) => ctx.api.open(&note)?,
        None => ctx.api.new_session(),
    };
    if std::io::stdin().is_terminal() {
        eprintln!("{}", "Reading editing events from stdin (Ctrl-D to finish)".dimmed());
    }

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let event = match parse_event(&line)? {
            Some(event) => event,
            None => continue,
        };
        debug!("event {:?}", event);
        let keep_going = apply_event(ctx, &mut session, event);
        print_notifications(&session.drain_notifications());
        if !keep_going {
            break;
        }
    }

    session.close();
    print_notifications(&session.drain_notifications());
    Ok(())
}

/// Forwards one event to the session; returns false once the session ended.
///
/// Errors are already queued as notifications by the session, so they are
/// dropped here and the script goes on.
fn apply_event(ctx: &mut AppContext, session: &mut EditingSession, event: Event) -> bool {
    let theme = ctx.config.theme;
    let api = &mut ctx.api;
    let _ = match event {
        Event::Title(title) => session.set_title(title),
        Event::Type(text) => session.type_text(&text),
        Event::Enter => session.enter(),
        Event::Format(command) => session.toggle_format(command),
        Event::Bullet => session.toggle_bullet_list(),
        Event::Numbered => session.toggle_numbered_list(),
        Event::Select { anchor, focus } => match session.document() {
            Some(doc) => {
                let selection = Selection {
                    anchor: doc.point(anchor),
                    focus: focus.map(|f| doc.point(f)),
                };
                session.select(selection)
            }
            None => session.select(Selection::default()),
        },
        Event::SelectAll => session.select_all(),
        Event::Delete => session.delete_selection(),
        Event::Tag(tag) => session.add_tag(&tag).map(|_| ()),
        Event::Untag(tag) => session.remove_tag(&tag).map(|_| ()),
        Event::PopTag => session.pop_tag().map(|_| ()),
        Event::Private { password, confirm } => api.set_private(session, &password, &confirm),
        Event::Lock => api.lock(session),
        Event::Unlock(password) => api.unlock(session, &password),
        Event::Public => api.request_make_public(session),
        Event::MakePublic(password) => api.make_public(session, &password),
        Event::Password { input, confirm } => {
            session.set_prompt_input(&input, &confirm);
            api.submit_prompt(session)
        }
        Event::Cancel => {
            session.cancel_prompt();
            Ok(())
        }
        Event::Save => api.save(session).map(|nav| {
            if let Navigation::Note(id) = nav {
                println!("{}", format!("Created note {}", id).dimmed());
            }
        }),
        Event::Show => {
            print!("{}", render_session(session, theme));
            Ok(())
        }
        Event::Status => {
            println!("{}", render_status(session));
            Ok(())
        }
        Event::Close => {
            session.close();
            return false;
        }
    };
    true
}

fn handle_delete(ctx: &mut AppContext, note: &str) -> Result<()> {
    let id = ctx.api.resolve(note)?;
    let title = ctx
        .api
        .list_notes(None)?
        .into_iter()
        .find(|n| n.id == id)
        .map(|n| n.title)
        .unwrap_or_default();
    match ctx.api.delete_note(id.as_str())? {
        Navigation::Landing => println!("{}", format!("Deleted \"{}\"", title).green()),
        Navigation::Note(_) | Navigation::Stay => {}
    }
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key, value) {
        (None, _) => {
            println!("theme = {}", ctx.config.theme);
            println!("file-ext = {}", ctx.config.file_ext);
        }
        (Some(key), None) => println!("{}", ctx.config.get(&key)?),
        (Some(key), Some(value)) => {
            ctx.config.set(&key, &value)?;
            ctx.config.save(&ctx.data_dir)?;
            let message = format!("{} = {}", key, ctx.config.get(&key)?);
            println!("{}", message.green());
        }
    }
    Ok(())
}
