//! Core CLI loop, dispatch, and shell context helpers.

use std::{io, path::PathBuf};

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;

use crate::{
    config::{Config, ConfigError, ConfigManager},
    core::{
        errors::PerkError,
        services::ServiceError,
        utils::PathResolver,
        PerkTracker,
    },
    domain::{CalendarMonth, MonthError},
    storage::JsonStorage,
    sync::{DirectoryRemote, SyncManager, SyncState},
};

pub use crate::core::errors::CliError;

use super::commands::{self, CommandDefinition, CommandRegistry};
use super::io as cli_io;
use super::output::{self, OutputPreferences};
pub use super::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, PathResolver::base_dir())
    }

    pub fn with_base_dir(mode: CliMode, base_dir: PathBuf) -> Result<Self, CliError> {
        let registry = CommandRegistry::new(commands::all_definitions());
        let config_manager = ConfigManager::with_base_dir(base_dir.clone())?;
        let config = config_manager.load().unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to load config, using defaults");
            Config::default()
        });

        let storage = JsonStorage::new(Some(base_dir.clone()))?;
        let tracker = PerkTracker::open(Box::new(storage))
            .with_default_color(config.default_card_color.clone());
        let current_month = tracker.current_month();

        let mut context = Self {
            mode,
            registry,
            tracker,
            theme: ColorfulTheme::default(),
            base_dir,
            config_manager,
            config,
            current_month,
            running: true,
        };
        context.apply_output_preferences();
        context.restore_sync();
        Ok(context)
    }

    /// Reattaches the remote remembered in the config, if any.
    fn restore_sync(&mut self) {
        let Some(dir) = self.config.remote_dir.clone() else {
            return;
        };
        if let Err(err) = self.attach_remote(dir) {
            tracing::warn!(error = %err, "could not reattach remote directory");
        }
    }

    pub(crate) fn attach_remote(&mut self, dir: PathBuf) -> Result<(), CommandError> {
        let remote = DirectoryRemote::new(&dir).map_err(PerkError::from)?;
        let state_path = PathResolver::sync_state_file_in(&self.base_dir);
        let state = SyncState::load(&state_path);
        let manager = SyncManager::new(Box::new(remote), self.config.remote_file_name.clone())
            .with_state(state, state_path);
        self.tracker.attach_sync(manager);
        tracing::info!(dir = %dir.display(), "remote directory attached");
        Ok(())
    }

    pub(crate) fn apply_output_preferences(&self) {
        output::set_preferences(OutputPreferences {
            screen_reader_mode: self.config.screen_reader_mode,
        });
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        format!("perks [{}]> ", self.current_month)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let handler = self.registry.get(command).map(|entry| entry.handler);
        if let Some(handler) = handler {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };

        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true)
            .map_err(|err| CliError::Input(err.to_string()))
    }

    /// Asks before a destructive action. Scripts must pass `--yes` instead.
    pub(crate) fn confirm(&self, prompt: &str, assume_yes: bool) -> Result<bool, CommandError> {
        if assume_yes {
            return Ok(true);
        }
        if self.mode == CliMode::Script {
            return Err(CommandError::InvalidArguments(
                "confirmation required; pass --yes to proceed".into(),
            ));
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(PerkError::Import(inner)) => {
                self.print_error(&format!("Import failed: {inner}"));
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    /// `YYYY-MM` argument, or the shell's current month when absent.
    pub(crate) fn month_arg(&self, arg: Option<&&str>) -> Result<CalendarMonth, CommandError> {
        match arg {
            Some(raw) => Ok(raw.parse::<CalendarMonth>()?),
            None => Ok(self.current_month),
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] PerkError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
            other => CommandError::Core(other.into()),
        }
    }
}

impl From<MonthError> for CommandError {
    fn from(err: MonthError) -> Self {
        CommandError::InvalidArguments(err.to_string())
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownKey(_) | ConfigError::InvalidValue { .. } => {
                CommandError::InvalidArguments(err.to_string())
            }
            other => CommandError::Core(other.into()),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::Io(inner) => CliError::Io(inner),
            other => CliError::Input(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(base_dir: PathBuf, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_base_dir(CliMode::Script, base_dir)?;
    for line in lines {
        match app.process_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn script_builds_cards_and_perks() {
        let temp = TempDir::new().unwrap();
        let app = process_script(
            temp.path().to_path_buf(),
            &["card add Platinum --issuer Amex", "card list"],
        )
        .unwrap();
        let cards = app.tracker.cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].issuer.as_deref(), Some("Amex"));
    }

    #[test]
    fn exit_stops_processing() {
        let temp = TempDir::new().unwrap();
        let app = process_script(
            temp.path().to_path_buf(),
            &["exit", "card add Ignored"],
        )
        .unwrap();
        assert!(app.tracker.cards().is_empty());
    }

    #[test]
    fn month_command_navigates() {
        let temp = TempDir::new().unwrap();
        let mut app = process_script(temp.path().to_path_buf(), &["month 2025-12"]).unwrap();
        app.process_line("month next").unwrap();
        assert_eq!(app.current_month, CalendarMonth::new(2026, 1).unwrap());
        app.process_line("month prev").unwrap();
        app.process_line("month prev").unwrap();
        assert_eq!(app.current_month, CalendarMonth::new(2025, 11).unwrap());
    }

    #[test]
    fn invalid_month_is_an_argument_error() {
        let temp = TempDir::new().unwrap();
        let mut app = process_script(temp.path().to_path_buf(), &[]).unwrap();
        let err = app.process_line("month 2025-13").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
    }

    #[test]
    fn clear_requires_yes_in_scripts() {
        let temp = TempDir::new().unwrap();
        let mut app = process_script(temp.path().to_path_buf(), &["card add Gold"]).unwrap();
        assert!(app.process_line("clear").is_err());
        assert_eq!(app.tracker.cards().len(), 1);
        app.process_line("clear --yes").unwrap();
        assert!(app.tracker.cards().is_empty());
    }
}
