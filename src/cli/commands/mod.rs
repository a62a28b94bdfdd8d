use std::collections::HashMap;

pub mod card;
pub mod checklist;
pub mod config;
pub mod data;
pub mod perk;
pub mod sync;
pub mod system;

use crate::cli::core::{CommandError, CommandResult, ShellContext};

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(card::definitions());
    commands.extend(perk::definitions());
    commands.extend(checklist::definitions());
    commands.extend(data::definitions());
    commands.extend(sync::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

/// Second-word completions offered by the interactive shell.
pub(crate) const SUBCOMMANDS: &[(&str, &[&str])] = &[
    ("card", &["add", "edit", "remove", "list"]),
    ("perk", &["add", "edit", "remove", "list"]),
    ("month", &["next", "prev"]),
    ("sync", &["connect", "push", "pull", "auto", "status", "disconnect"]),
    ("config", &["show", "set"]),
];

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Positional arguments and `--flag value` pairs of one command line.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    options: HashMap<&'static str, &'a str>,
    switches: Vec<&'static str>,
}

impl<'a> ParsedArgs<'a> {
    /// Splits `args`, accepting only the listed value options and boolean switches.
    pub fn parse(
        args: &[&'a str],
        options: &[&'static str],
        switches: &[&'static str],
    ) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(flag) = arg.strip_prefix("--") else {
                parsed.positional.push(arg);
                continue;
            };
            if let Some(name) = switches.iter().copied().find(|name| *name == flag) {
                parsed.switches.push(name);
            } else if let Some(name) = options.iter().copied().find(|name| *name == flag) {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("--{name} expects a value"))
                })?;
                parsed.options.insert(name, value);
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `{arg}`"
                )));
            }
        }
        Ok(parsed)
    }

    pub fn option(&self, name: &str) -> Option<&'a str> {
        self.options.get(name).copied()
    }

    pub fn switch(&self, name: &str) -> bool {
        self.switches.contains(&name)
    }
}

pub(crate) fn parse_limit(raw: &str) -> Result<u32, CommandError> {
    match raw.parse::<u32>() {
        Ok(limit) if limit >= 1 => Ok(limit),
        _ => Err(CommandError::InvalidArguments(format!(
            "limit must be a whole number of at least 1, got `{raw}`"
        ))),
    }
}

pub(crate) fn require<'a>(value: Option<&&'a str>, usage: &str) -> Result<&'a str, CommandError> {
    value
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
}

/// Number of id characters shown in listings.
pub(crate) const SHORT_ID_LEN: usize = 8;

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Resolves a full id or a unique id prefix against `ids`.
pub(crate) fn resolve_id<'a, I>(kind: &str, input: &str, ids: I) -> Result<String, CommandError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut matches = Vec::new();
    for id in ids {
        if id == input {
            return Ok(id.to_string());
        }
        if id.starts_with(input) {
            matches.push(id);
        }
    }
    match matches.as_slice() {
        [single] => Ok(single.to_string()),
        [] => Err(CommandError::Message(format!("No {kind} matches `{input}`."))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{input}` matches several {kind}s; use more characters"
        ))),
    }
}
