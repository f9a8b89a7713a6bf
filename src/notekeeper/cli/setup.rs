use clap::{Parser, Subcommand};

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "notekeeper", bin_name = "notekeeper", version = get_version())]
#[command(about = "Personal notes with rich text and password-locked private notes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List notes, most recently updated first
    #[command(alias = "ls")]
    List {
        /// Only notes whose title or content contains this text
        search: Option<String>,
    },

    /// Show a note
    View {
        /// List position or id of the note
        note: String,

        /// Unlock a private note with this password
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Edit a note (or a new one) with editing events read from stdin
    Edit {
        /// List position or id of the note; omit to start a new note
        note: Option<String>,
    },

    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// List position or id of the note
        note: String,
    },

    /// Get or set configuration values (theme, file-ext)
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_view_with_password() {
        let cli = Cli::try_parse_from(["notekeeper", "view", "2", "--password", "abcd"]).unwrap();
        match cli.command {
            Some(Commands::View { note, password }) => {
                assert_eq!(note, "2");
                assert_eq!(password.as_deref(), Some("abcd"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn edit_without_note_starts_a_new_one() {
        let cli = Cli::try_parse_from(["notekeeper", "-v", "edit"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Edit { note: None })));
    }

    #[test]
    fn no_command_is_allowed() {
        let cli = Cli::try_parse_from(["notekeeper"]).unwrap();
        assert!(cli.command.is_none());
    }
}
