//! # NoteKeeper Architecture
//!
//! NoteKeeper is a **UI-agnostic note editing library**: a rich-text document
//! model, the formatting and list engines that edit it, password-locked
//! private notes, and a storage abstraction. The `notekeeper` binary is one
//! thin client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Adapter (cli/, wired by main.rs)                       │
//! │  - Parses arguments and input events, renders documents    │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Resolves list positions to ids, hides private content    │
//! │  - Returns navigation outcomes                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session Layer (session.rs)                                 │
//! │  - The one open note: body, lock, dirty state, prompts      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine Layer (format.rs, lists.rs, lock.rs, save.rs)       │
//! │  Document Layer (document/)                                 │
//! │  - Pure transformations of owned values                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract NoteStore trait                                 │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes and returns plain Rust values. It never
//! writes to stdout or stderr and never assumes a terminal. Errors come back
//! as [`error::NoteError`]; the session also queues a
//! [`messages::Notification`] for whatever UI is showing it.
//!
//! ## Private Notes
//!
//! A locked private note is loaded through [`store::NoteStore::fetch_meta`]
//! only. Its content and tags are not in memory until the right password is
//! given, and [`session::EditingSession`] makes this a type-level fact: the
//! note body is an `Option` that is `None` while locked.
//!
//! ## Testing Strategy
//!
//! 1. **Document and engines**: unit tests on owned documents, no store.
//! 2. **Session and API**: unit tests against [`store::memory::InMemoryStore`]
//!    and its fixtures (behind the `test_utils` feature outside this crate).
//! 3. **CLI**: integration tests in `tests/` running the binary against a
//!    temporary `NOTEKEEPER_HOME`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`session`]: The editing session of one open note
//! - [`document`]: Blocks, runs, selections, edits and markdown
//! - [`format`]: Toolbar commands and the formatting engine
//! - [`lists`]: List mode and newline continuation
//! - [`lock`]: The privacy lock state machine and password prompts
//! - [`password`]: Password digests and validation
//! - [`save`]: Dirty tracking and the save indicator
//! - [`messages`]: Transient notifications
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Note`, `NoteMeta`, `NoteData`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing, event scripts and terminal rendering for the binary (not part of the lib API)

pub mod api;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod lists;
pub mod lock;
pub mod messages;
pub mod model;
pub mod password;
pub mod save;
pub mod session;
pub mod store;
