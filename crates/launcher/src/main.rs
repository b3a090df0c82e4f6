//! Binary entrypoint for the launcher command line.
use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};
use config::{ProfileStore, ProfileUpdate, Settings, SettingsPatch};
use tracing::{debug, error};

/// Subcommand implementations.
mod commands;
mod error;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "launcher", about = "Multi-profile game launcher", version)]
/// Command-line interface for the `launcher` binary.
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,

    /// Data directory (defaults to $LAUNCHER_HOME, then ~/.flyff-launcher)
    #[arg(long, value_name = "DIR", global = true)]
    home: Option<PathBuf>,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Manage profiles.
    #[command(subcommand)]
    Profiles(ProfilesCmd),
    /// Show or change launcher settings.
    #[command(subcommand)]
    Settings(SettingsCmd),
    /// Inspect shortcut strings.
    #[command(subcommand)]
    Shortcuts(ShortcutsCmd),
}

#[derive(Subcommand, Debug)]
/// Profile subcommands.
enum ProfilesCmd {
    /// List profiles in launcher order.
    List,
    /// Create a profile.
    Add {
        /// Profile name.
        name: String,
        /// Job tag (defaults to the first known job).
        #[arg(long)]
        job: Option<String>,
    },
    /// Rename a profile, keeping its storage partition.
    Rename {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Change a profile's name, frame or job.
    Update {
        /// Profile to change.
        name: String,
        /// New name.
        #[arg(long)]
        rename: Option<String>,
        /// Show the native window frame.
        #[arg(long)]
        frame: Option<bool>,
        /// New job tag.
        #[arg(long)]
        job: Option<String>,
    },
    /// Delete a profile.
    Delete {
        /// Profile name.
        name: String,
    },
    /// Duplicate a profile as "<name> Copy".
    Clone {
        /// Profile to duplicate.
        name: String,
    },
    /// Move the listed profiles to the front, in the given order.
    Reorder {
        /// Profile names.
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Forget a profile's saved window position and size.
    ResetWindow {
        /// Profile name.
        name: String,
    },
    /// Set a profile's mute state.
    Mute {
        /// Profile name.
        name: String,
        /// Unmute instead.
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand, Debug)]
/// Settings subcommands.
enum SettingsCmd {
    /// Print the current settings.
    Show,
    /// Change one or more settings.
    Set {
        /// Allow bare single-key shortcuts to be registered globally.
        #[arg(long)]
        allow_single_key: Option<bool>,
        /// Keep the launcher open after launching a profile.
        #[arg(long)]
        stay_open: Option<bool>,
    },
}

#[derive(Subcommand, Debug)]
/// Shortcut subcommands.
enum ShortcutsCmd {
    /// Normalize shortcuts and report whether they register globally.
    Check {
        /// Shortcut strings, e.g. "ctrl+1" or "pgdn".
        #[arg(required = true)]
        shortcuts: Vec<String>,
    },
    /// List the launcher's reserved shortcuts.
    Reserved,
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let dir = config::data_dir(cli.home.as_deref());
    debug!(dir = %dir.display(), "data_dir");
    let store = ProfileStore::at(config::profiles_path(&dir));
    let settings_path = config::settings_path(&dir);

    match &cli.command {
        Command::Profiles(cmd) => match cmd {
            ProfilesCmd::List => Ok(commands::list_profiles(&store)),
            ProfilesCmd::Add { name, job } => commands::add_profile(&store, name, job.as_deref()),
            ProfilesCmd::Rename { from, to } => commands::rename_profile(&store, from, to),
            ProfilesCmd::Update {
                name,
                rename,
                frame,
                job,
            } => commands::update_profile(
                &store,
                name,
                ProfileUpdate {
                    name: rename.clone(),
                    frame: *frame,
                    job: job.clone(),
                },
            ),
            ProfilesCmd::Delete { name } => commands::delete_profile(&store, name),
            ProfilesCmd::Clone { name } => commands::clone_profile(&store, name),
            ProfilesCmd::Reorder { names } => commands::reorder_profiles(&store, names),
            ProfilesCmd::ResetWindow { name } => commands::reset_window(&store, name),
            ProfilesCmd::Mute { name, off } => commands::set_muted(&store, name, !*off),
        },
        Command::Settings(SettingsCmd::Show) => {
            Ok(commands::show_settings(&Settings::load(&settings_path)))
        }
        Command::Settings(SettingsCmd::Set {
            allow_single_key,
            stay_open,
        }) => commands::set_settings(
            &settings_path,
            SettingsPatch {
                stay_open_after_launch: *stay_open,
                allow_single_key_global: *allow_single_key,
            },
        ),
        Command::Shortcuts(ShortcutsCmd::Check { shortcuts }) => {
            commands::check_shortcuts(&Settings::load(&settings_path), shortcuts)
        }
        Command::Shortcuts(ShortcutsCmd::Reserved) => Ok(commands::list_reserved()),
    }
}

fn main() {
    let cli = Cli::parse();
    let dir = config::data_dir(cli.home.as_deref());
    let guard = match logging::init(&cli.log.spec(), Some(dir.as_path())) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}", CliError::from(e));
            process::exit(1);
        }
    };

    let code = match run(&cli) {
        Ok(out) => {
            print!("{out}");
            0
        }
        Err(e) => {
            error!(error = %e, "command_failed");
            eprintln!("error: {e}");
            1
        }
    };
    // Flush the log file before exiting.
    drop(guard);
    process::exit(code);
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "launcher", "--debug", "profiles", "add", "Hero", "--job", "Knight", "--home", "/tmp/x",
        ])
        .unwrap();
        assert!(cli.log.debug);
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Command::Profiles(ProfilesCmd::Add { name, job }) => {
                assert_eq!(name, "Hero");
                assert_eq!(job.as_deref(), Some("Knight"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["launcher", "settings", "set", "--allow-single-key", "true"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Settings(SettingsCmd::Set {
                allow_single_key: Some(true),
                stay_open: None
            })
        ));
        assert!(Cli::try_parse_from(["launcher", "shortcuts", "check"]).is_err());
    }
}
