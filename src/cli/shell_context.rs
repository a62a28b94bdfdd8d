use std::path::PathBuf;

use dialoguer::theme::ColorfulTheme;

use crate::{
    config::{Config, ConfigManager},
    core::PerkTracker,
    domain::CalendarMonth,
};

use super::commands::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub tracker: PerkTracker,
    pub theme: ColorfulTheme,
    pub base_dir: PathBuf,
    pub config_manager: ConfigManager,
    pub config: Config,
    /// Month shown by `checklist` and used by `check`/`uncheck` without an explicit month.
    pub current_month: CalendarMonth,
    pub running: bool,
}
